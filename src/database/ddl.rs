//! DDL and DML operations
//!
//! Every operation here executes and commits; on failure the whole call rolls
//! back and raises a [`DbError`](super::error::DbError) carrying the failing
//! statement text. Single statements rely on the engine's own per-statement
//! atomicity; multi-statement operations run inside one explicit transaction.

use rusqlite::Transaction;

use super::connection::SpatialiteConn;
use super::error::{DbError, Result};
use super::quote::{quote_ident, quote_literal};
use super::types::TableField;

/// Default geometry column name used across the SpatiaLite ecosystem.
pub const DEFAULT_GEOMETRY_COLUMN: &str = "the_geom";

/// SRID value meaning "unspecified".
pub const UNKNOWN_SRID: i32 = -1;

fn insert_sql(table: &str, values: &[&str]) -> String {
    format!(
        "INSERT INTO {} VALUES ({})",
        quote_ident(table),
        values.join(", ")
    )
}

impl SpatialiteConn {
    /// Register a new geometry column on an existing table.
    pub fn add_geometry_column(
        &self,
        table: &str,
        geometry_type: &str,
        column: &str,
        srid: i32,
        dimension: &str,
    ) -> Result<()> {
        let sql = format!(
            "SELECT AddGeometryColumn({}, {}, {}, {}, {})",
            quote_literal(table),
            quote_literal(column),
            srid,
            quote_literal(geometry_type),
            quote_literal(dimension),
        );
        self.run_sql(&sql)
    }

    /// Discard a geometry column and its catalog registration.
    pub fn delete_geometry_column(&self, table: &str, column: &str) -> Result<()> {
        let sql = format!(
            "SELECT DiscardGeometryColumn({}, {})",
            quote_literal(table),
            quote_literal(column),
        );
        self.run_sql(&sql)
    }

    /// Drop a table holding one or more geometry columns.
    ///
    /// The drop is unconditional; geometry registrations are not cleaned up
    /// first.
    pub fn delete_geometry_table(&self, table: &str) -> Result<()> {
        self.run_sql(&format!("DROP TABLE {}", quote_ident(table)))
    }

    /// Create an ordinary table from a list of field specifications,
    /// optionally naming a primary-key column.
    ///
    /// Fails closed on an empty field list: no statement is executed and
    /// `Ok(false)` is returned.
    pub fn create_table(
        &self,
        table: &str,
        fields: &[TableField],
        primary_key: Option<&str>,
    ) -> Result<bool> {
        if fields.is_empty() {
            return Ok(false);
        }

        let columns: Vec<String> = fields.iter().map(|f| f.definition()).collect();
        let mut sql = format!("CREATE TABLE {} ({}", quote_ident(table), columns.join(", "));
        if let Some(pkey) = primary_key {
            sql.push_str(&format!(", PRIMARY KEY ({})", quote_ident(pkey)));
        }
        sql.push(')');

        self.run_sql(&sql)?;
        Ok(true)
    }

    /// Drop a table.
    pub fn delete_table(&self, table: &str) -> Result<()> {
        self.run_sql(&format!("DROP TABLE {}", quote_ident(table)))
    }

    /// Delete all rows from a table.
    pub fn empty_table(&self, table: &str) -> Result<()> {
        self.run_sql(&format!("DELETE FROM {}", quote_ident(table)))
    }

    /// Rename a table, keeping the spatial metadata catalog consistent.
    ///
    /// When the catalog is present the rename and the `geometry_columns`
    /// update run inside one transaction, so a failure leaves neither applied.
    pub fn rename_table(&self, table: &str, new_name: &str) -> Result<()> {
        let mut statements = vec![format!(
            "ALTER TABLE {} RENAME TO {}",
            quote_ident(table),
            quote_ident(new_name)
        )];
        if self.has_spatial() {
            statements.push(format!(
                "UPDATE geometry_columns SET f_table_name = {} WHERE f_table_name = {}",
                quote_literal(new_name),
                quote_literal(table)
            ));
        }
        self.run_batch(&statements)
    }

    /// Create a view over an arbitrary query.
    pub fn create_view(&self, name: &str, query: &str) -> Result<()> {
        self.run_sql(&format!("CREATE VIEW {} AS {}", quote_ident(name), query))
    }

    /// Drop a view.
    pub fn delete_view(&self, name: &str) -> Result<()> {
        self.run_sql(&format!("DROP VIEW {}", quote_ident(name)))
    }

    /// Rename a view. Delegates to [`rename_table`](SpatialiteConn::rename_table);
    /// the engine decides whether the object can be renamed.
    pub fn rename_view(&self, name: &str, new_name: &str) -> Result<()> {
        self.rename_table(name, new_name)
    }

    /// Add a column to an existing table.
    pub fn add_table_column(&self, table: &str, field: &TableField) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} ADD {}",
            quote_ident(table),
            field.definition()
        );
        self.run_sql(&sql)
    }

    /// Drop a trigger.
    pub fn delete_trigger(&self, trigger: &str) -> Result<()> {
        self.run_sql(&format!("DROP TRIGGER {}", quote_ident(trigger)))
    }

    /// Create an index on one column.
    pub fn create_index(&self, table: &str, name: &str, column: &str, unique: bool) -> Result<()> {
        let unique_kw = if unique { "UNIQUE " } else { "" };
        let sql = format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique_kw,
            quote_ident(name),
            quote_ident(table),
            quote_ident(column)
        );
        self.run_sql(&sql)
    }

    /// Build an R*Tree spatial index over a geometry column.
    pub fn create_spatial_index(&self, table: &str, column: &str) -> Result<()> {
        let sql = format!(
            "SELECT CreateSpatialIndex({}, {})",
            quote_literal(table),
            quote_literal(column)
        );
        self.run_sql(&sql)
    }

    /// Drop an index.
    pub fn delete_index(&self, name: &str) -> Result<()> {
        self.run_sql(&format!("DROP INDEX {}", quote_ident(name)))
    }

    /// Discard the spatial index over a geometry column.
    pub fn delete_spatial_index(&self, table: &str, column: &str) -> Result<()> {
        let sql = format!(
            "SELECT DiscardSpatialIndex({}, {})",
            quote_literal(table),
            quote_literal(column)
        );
        self.run_sql(&sql)
    }

    /// Rebuild the database file. Runs outside any transaction, as the
    /// engine requires.
    pub fn vacuum(&self) -> Result<()> {
        self.run_sql("VACUUM")
    }

    /// Insert one row, committing immediately.
    ///
    /// The value fragments are joined verbatim into the `VALUES` clause: this
    /// call performs NO escaping, callers must pass pre-escaped literals
    /// (e.g. via [`quote_literal`]). For batched inserts open a
    /// [`transaction`](SpatialiteConn::transaction) and use
    /// [`insert_row_in`](SpatialiteConn::insert_row_in).
    pub fn insert_row(&self, table: &str, values: &[&str]) -> Result<()> {
        self.run_sql(&insert_sql(table, values))
    }

    /// Insert one row on a caller-held transaction without committing, so
    /// many inserts can share one commit. The same pre-escaped-literal
    /// contract as [`insert_row`](SpatialiteConn::insert_row) applies.
    pub fn insert_row_in(tx: &Transaction<'_>, table: &str, values: &[&str]) -> Result<()> {
        let sql = insert_sql(table, values);
        tx.execute(&sql, [])
            .map_err(|e| DbError::statement(e, sql))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> SpatialiteConn {
        SpatialiteConn::open_in_memory().unwrap()
    }

    fn table_exists(db: &SpatialiteConn, name: &str) -> bool {
        let count: i64 = db
            .connection()
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count > 0
    }

    #[test]
    fn test_create_table_empty_fields_is_a_no_op() {
        let db = memory_db();
        let created = db.create_table("t", &[], None).unwrap();
        assert!(!created);
        assert!(!table_exists(&db, "t"));
    }

    #[test]
    fn test_create_and_delete_table() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        assert!(table_exists(&db, "t"));

        db.delete_table("t").unwrap();
        assert!(!table_exists(&db, "t"));
    }

    #[test]
    fn test_delete_missing_table_reports_statement() {
        let db = memory_db();
        let err = db.delete_table("nope").unwrap_err();
        assert_eq!(err.query(), Some("DROP TABLE \"nope\""));

        // The failure must not poison the handle.
        let created = db
            .create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        assert!(created);
    }

    #[test]
    fn test_empty_table() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        db.insert_row("t", &["1"]).unwrap();
        db.insert_row("t", &["2"]).unwrap();
        assert_eq!(db.get_table_row_count("t").unwrap(), 2);

        db.empty_table("t").unwrap();
        assert_eq!(db.get_table_row_count("t").unwrap(), 0);
    }

    #[test]
    fn test_rename_table_plain() {
        let db = memory_db();
        db.create_table("old", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        db.rename_table("old", "new").unwrap();
        assert!(!table_exists(&db, "old"));
        assert!(table_exists(&db, "new"));
    }

    #[test]
    fn test_rename_table_updates_geometry_catalog() {
        let mut db = memory_db();
        db.connection()
            .execute(
                "CREATE TABLE geometry_columns (
                    f_table_name TEXT,
                    f_geometry_column TEXT,
                    type TEXT,
                    coord_dimension TEXT,
                    srid INTEGER,
                    spatial_index_enabled INTEGER
                )",
                [],
            )
            .unwrap();
        assert!(db.check_spatial());

        db.connection()
            .execute("CREATE TABLE pts (id INTEGER, geom BLOB)", [])
            .unwrap();
        db.connection()
            .execute(
                "INSERT INTO geometry_columns VALUES ('pts', 'geom', 'POINT', '2', 4326, 0)",
                [],
            )
            .unwrap();

        db.rename_table("pts", "points").unwrap();

        let tables = db.list_geo_tables().unwrap();
        assert!(!tables.iter().any(|t| t.name == "pts"));
        let renamed = tables.iter().find(|t| t.name == "points").unwrap();
        assert_eq!(renamed.geometry_column.as_deref(), Some("geom"));
    }

    #[test]
    fn test_views() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        db.create_view("v", "SELECT id FROM t").unwrap();
        assert!(db.get_view_definition("v").is_ok());

        db.delete_view("v").unwrap();
        assert!(db.get_view_definition("v").is_err());
    }

    #[test]
    fn test_add_table_column() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        db.add_table_column("t", &TableField::new("name", "TEXT"))
            .unwrap();

        let fields = db.get_table_fields("t").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "name");
    }

    #[test]
    fn test_create_and_delete_index() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("a", "INTEGER")], None)
            .unwrap();
        db.create_index("t", "ix_t_a", "a", false).unwrap();
        assert_eq!(db.get_table_indexes("t").unwrap().len(), 1);

        db.delete_index("ix_t_a").unwrap();
        assert!(db.get_table_indexes("t").unwrap().is_empty());
    }

    #[test]
    fn test_delete_trigger() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        db.connection()
            .execute(
                "CREATE TRIGGER trg AFTER INSERT ON t BEGIN UPDATE t SET id = id; END",
                [],
            )
            .unwrap();
        assert_eq!(db.get_table_triggers("t").unwrap().len(), 1);

        db.delete_trigger("trg").unwrap();
        assert!(db.get_table_triggers("t").unwrap().is_empty());
    }

    #[test]
    fn test_insert_row_with_escaped_literal() {
        let db = memory_db();
        db.create_table(
            "t",
            &[TableField::new("id", "INTEGER"), TableField::new("name", "TEXT")],
            None,
        )
        .unwrap();
        let name = crate::database::quote::quote_literal("it's");
        db.insert_row("t", &["1", &name]).unwrap();

        let stored: String = db
            .connection()
            .query_row("SELECT name FROM t WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "it's");
    }

    #[test]
    fn test_insert_rows_batched() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();

        let tx = db.transaction().unwrap();
        SpatialiteConn::insert_row_in(&tx, "t", &["1"]).unwrap();
        SpatialiteConn::insert_row_in(&tx, "t", &["2"]).unwrap();
        tx.commit().unwrap();
        assert_eq!(db.get_table_row_count("t").unwrap(), 2);
    }

    #[test]
    fn test_uncommitted_batch_rolls_back() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();

        {
            let tx = db.transaction().unwrap();
            SpatialiteConn::insert_row_in(&tx, "t", &["1"]).unwrap();
            // Dropped without commit.
        }
        assert_eq!(db.get_table_row_count("t").unwrap(), 0);
    }

    #[test]
    fn test_vacuum() {
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        db.vacuum().unwrap();
    }

    #[test]
    fn test_spatial_functions_report_statement_on_plain_database() {
        // Without the extension the spatial admin functions don't exist; the
        // error must still carry the generated statement.
        let db = memory_db();
        db.create_table("t", &[TableField::new("id", "INTEGER")], None)
            .unwrap();
        let err = db
            .add_geometry_column("t", "POINT", DEFAULT_GEOMETRY_COLUMN, UNKNOWN_SRID, "XY")
            .unwrap_err();
        let sql = err.query().unwrap();
        assert!(sql.starts_with("SELECT AddGeometryColumn('t', 'the_geom', -1, 'POINT', 'XY')"));
    }
}
