//! Query layer sources
//!
//! Turns an arbitrary SQL query into a map-layer data source: the query is
//! wrapped in parentheses as the table expression of a SpatiaLite provider
//! URI, together with a geometry column and a unique key column. The host GIS
//! application feeds the resulting URI into its vector-layer API.

use serde::Serialize;

use crate::database::DEFAULT_GEOMETRY_COLUMN;

/// Provider name understood by the host application for SpatiaLite sources.
pub const PROVIDER: &str = "spatialite";

/// Default unique key column offered for query layers.
pub const DEFAULT_KEY_COLUMN: &str = "id";

/// An ad-hoc SQL query to be materialized as a map layer.
#[derive(Debug, Clone, Serialize)]
pub struct QueryLayer {
    pub query: String,
    /// Geometry column of the result set.
    pub geometry_column: String,
    /// Column uniquely identifying each result row.
    pub key_column: String,
}

impl QueryLayer {
    /// A query layer with the conventional `the_geom`/`id` columns.
    pub fn new(query: impl Into<String>) -> Self {
        QueryLayer {
            query: query.into(),
            geometry_column: DEFAULT_GEOMETRY_COLUMN.to_string(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
        }
    }

    pub fn with_geometry_column(mut self, column: impl Into<String>) -> Self {
        self.geometry_column = column.into();
        self
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }

    /// Build the provider data-source URI for the given database file.
    ///
    /// The query is parenthesized as the table expression; leading whitespace
    /// is stripped so a query pasted with an empty first line still parses.
    pub fn source(&self, database: &str) -> String {
        format!(
            "dbname='{}' key='{}' table=\"({})\" ({}) sql=",
            database.replace('\'', "\\'"),
            self.key_column,
            self.query.trim_start(),
            self.geometry_column,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_uri() {
        let layer = QueryLayer::new("SELECT id, the_geom FROM roads");
        assert_eq!(
            layer.source("/data/roads.sqlite"),
            "dbname='/data/roads.sqlite' key='id' \
             table=\"(SELECT id, the_geom FROM roads)\" (the_geom) sql="
        );
    }

    #[test]
    fn test_source_strips_leading_whitespace() {
        let layer = QueryLayer::new("\n  SELECT * FROM pts");
        assert!(layer
            .source("/db.sqlite")
            .contains("table=\"(SELECT * FROM pts)\""));
    }

    #[test]
    fn test_custom_columns() {
        let layer = QueryLayer::new("SELECT gid, geom FROM a")
            .with_geometry_column("geom")
            .with_key_column("gid");
        let uri = layer.source("/db.sqlite");
        assert!(uri.contains("key='gid'"));
        assert!(uri.ends_with("(geom) sql="));
    }

    #[test]
    fn test_database_path_with_quote_is_escaped() {
        let layer = QueryLayer::new("SELECT 1");
        assert!(layer
            .source("/data/it's.sqlite")
            .starts_with("dbname='/data/it\\'s.sqlite'"));
    }
}
