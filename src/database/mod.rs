//! SpatiaLite database connector
//!
//! This module provides the database layer for sqlayer, organized into:
//!
//! - **connection**: the `SpatialiteConn` handle wrapper and spatial probing
//! - **introspect**: read-only catalog introspection (tables, columns,
//!   indexes, triggers, views, extents)
//! - **ddl**: schema and data mutation (tables, views, indexes, geometry
//!   columns, row inserts)
//! - **types**: immutable catalog snapshot types and the `TableField` DDL
//!   input specification
//! - **quote**: identifier and literal escaping for generated SQL
//! - **error**: the typed `DbError` carrying the offending statement text
//!
//! # Concurrency model
//!
//! Everything is single-threaded, synchronous and blocking. A
//! `SpatialiteConn` exclusively owns its handle; there is no pooling,
//! cancellation or timeout. Long statements run to completion or error.

mod connection;
mod ddl;
mod error;
mod introspect;
pub mod quote;
mod types;

pub use connection::{SpatialiteConn, SPATIALITE_MODULE};
pub use ddl::{DEFAULT_GEOMETRY_COLUMN, UNKNOWN_SRID};
pub use error::{DbError, Result};
pub use types::{
    Extent, GeoTable, SpatialInfo, TableAttribute, TableField, TableIndex, TableTrigger,
};
