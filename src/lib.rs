#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Sqlayer - ad-hoc SQL layers for SpatiaLite databases
//!
//! Sqlayer wraps a local SpatiaLite (or plain SQLite) database file with
//! schema introspection and DDL operations, and turns arbitrary SQL queries
//! into map-layer data sources. It can be used as both a command-line
//! application and a library.
//!
//! # Architecture
//!
//! - **[`database`]**: the spatial database connector
//!   - `connection`: the `SpatialiteConn` handle wrapper
//!   - `introspect`: catalog introspection (tables, columns, indexes,
//!     triggers, views, extents)
//!   - `ddl`: schema mutation (tables, views, indexes, geometry columns)
//!   - `types` / `quote` / `error`: snapshots, SQL escaping, typed errors
//! - **[`config`]**: the named connection-profile registry
//! - **[`layer`]**: query-to-map-layer source building
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sqlayer::config::ConnectionRegistry;
//! use sqlayer::layer::QueryLayer;
//!
//! // Resolve a named profile from ~/.sqlayer/sqlayer.toml and connect
//! let registry = ConnectionRegistry::load(None)?;
//! let db = registry.connect("parks")?;
//!
//! // Introspect
//! for table in db.list_geo_tables()? {
//!     if !table.is_system {
//!         println!("{} ({:?})", table.name, table.geometry_column);
//!     }
//! }
//!
//! // Build a map-layer source for an ad-hoc query
//! let layer = QueryLayer::new("SELECT id, the_geom FROM trees WHERE height > 10");
//! if let Some(path) = db.path() {
//!     println!("{}", layer.source(path));
//! }
//! ```

pub mod config;
pub mod database;
pub mod layer;

pub use config::{ConnectionProfile, ConnectionRegistry};
pub use database::{
    DbError, Extent, GeoTable, Result, SpatialInfo, SpatialiteConn, TableAttribute, TableField,
    TableIndex, TableTrigger, DEFAULT_GEOMETRY_COLUMN, SPATIALITE_MODULE, UNKNOWN_SRID,
};
pub use layer::QueryLayer;
