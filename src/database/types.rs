//! Schema metadata types
//!
//! Catalog snapshot types (`TableAttribute`, `TableIndex`, `TableTrigger`,
//! `GeoTable`) are read-only projections of one introspection query row each;
//! they never round-trip back into the database. `TableField` is the one
//! exception by design: it is a DDL *input* specification, not a catalog read.

use serde::Serialize;

use super::quote::{quote_ident, quote_literal};

/// One column definition, as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, Serialize)]
pub struct TableAttribute {
    /// Ordinal position of the column in the table.
    pub ordinal: i32,
    pub name: String,
    /// Declared type, verbatim from the catalog. May be empty for untyped
    /// columns.
    pub data_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

impl TableAttribute {
    /// Whether the column carries a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// One index, as reported by `PRAGMA index_list` plus `PRAGMA index_info`.
#[derive(Debug, Clone, Serialize)]
pub struct TableIndex {
    /// Ordinal of the index in the catalog listing.
    pub ordinal: i32,
    pub name: String,
    pub unique: bool,
    /// Column ordinals covered by the index, in catalog-reported order.
    pub columns: Vec<i32>,
}

/// One trigger, as reported by `sqlite_master`.
#[derive(Debug, Clone, Serialize)]
pub struct TableTrigger {
    pub name: String,
    /// The defining SQL body.
    pub definition: String,
    /// Always true at construction: the engine has no reliable way to report
    /// trigger state after the fact, so this is a default rather than a read.
    pub enabled: bool,
}

/// A field specification used as DDL input for `create_table` and
/// `add_table_column`.
#[derive(Debug, Clone, Serialize)]
pub struct TableField {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    /// Default value, quoted as a string literal in the generated definition.
    pub default: Option<String>,
}

impl TableField {
    /// A nullable field with no default.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        TableField {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
        }
    }

    /// Mark the field NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Attach a default value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The column definition fragment used inside CREATE TABLE / ALTER TABLE.
    pub fn definition(&self) -> String {
        let mut def = format!("{} {}", quote_ident(&self.name), self.data_type);
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            def.push_str(" DEFAULT ");
            def.push_str(&quote_literal(default));
        }
        def
    }
}

/// One row of the table/view enumeration produced by `list_geo_tables`.
///
/// A table registered with more than one geometry column appears once per
/// geometry column; a table with none appears once with the geometry fields
/// unset.
#[derive(Debug, Clone, Serialize)]
pub struct GeoTable {
    pub name: String,
    /// Catalog object kind: `table` or `view`.
    pub kind: String,
    pub geometry_column: Option<String>,
    pub geometry_type: Option<String>,
    pub dimension: Option<String>,
    pub srid: Option<i32>,
    /// True for spatial-index helper tables and engine statistics tables.
    pub is_system: bool,
}

/// SpatiaLite library version information.
#[derive(Debug, Clone, Serialize)]
pub struct SpatialInfo {
    pub library_version: String,
    pub geos_version: String,
    pub proj_version: String,
}

/// Bounding box computed by `get_estimated_extent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_definition_minimal() {
        let field = TableField::new("name", "TEXT");
        assert_eq!(field.definition(), "\"name\" TEXT");
    }

    #[test]
    fn test_field_definition_full() {
        let field = TableField::new("status", "TEXT").not_null().with_default("new");
        assert_eq!(field.definition(), "\"status\" TEXT NOT NULL DEFAULT 'new'");
    }

    #[test]
    fn test_field_definition_quotes_name() {
        let field = TableField::new("we\"ird", "INTEGER");
        assert_eq!(field.definition(), "\"we\"\"ird\" INTEGER");
    }

    #[test]
    fn test_attribute_has_default() {
        let attr = TableAttribute {
            ordinal: 0,
            name: "id".to_string(),
            data_type: "INTEGER".to_string(),
            not_null: true,
            default: None,
            primary_key: true,
        };
        assert!(!attr.has_default());

        let with_default = TableAttribute {
            default: Some("0".to_string()),
            ..attr
        };
        assert!(with_default.has_default());
    }
}
