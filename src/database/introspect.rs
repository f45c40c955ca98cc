//! Catalog introspection operations
//!
//! All operations here execute one statement (plus per-index follow-ups for
//! `get_table_indexes`) and return parsed snapshots; they never mutate.

use std::collections::HashSet;

use super::connection::SpatialiteConn;
use super::error::{DbError, Result};
use super::quote::quote_ident;
use super::types::{Extent, GeoTable, TableAttribute, TableIndex, TableTrigger};

/// Statistics table maintained by the engine, never a user table.
const STAT_TABLE: &str = "sqlite_stat1";

impl SpatialiteConn {
    /// Enumerate tables and views together with their geometry registration.
    ///
    /// When the spatial metadata catalog is present, `sqlite_master` is
    /// left-joined with `geometry_columns` on lower-cased name, so a table
    /// appears once per registered geometry column (or once with unset
    /// geometry fields). Spatial-index helper tables and the engine's
    /// statistics table are flagged as system tables but still enumerated.
    pub fn list_geo_tables(&self) -> Result<Vec<GeoTable>> {
        let mut system: HashSet<String> = HashSet::new();
        system.insert(STAT_TABLE.to_string());

        if self.has_spatial() {
            // R*Tree helper tables for every enabled spatial index.
            let sql = "SELECT f_table_name, f_geometry_column FROM geometry_columns \
                       WHERE spatial_index_enabled = 1";
            let mut stmt = self
                .connection()
                .prepare(sql)
                .map_err(|e| DbError::statement(e, sql))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(|e| DbError::statement(e, sql))?;
            for row in rows {
                let (table, geom) = row.map_err(|e| DbError::statement(e, sql))?;
                system.insert(format!("idx_{table}_{geom}"));
                system.insert(format!("idx_{table}_{geom}_node"));
                system.insert(format!("idx_{table}_{geom}_parent"));
                system.insert(format!("idx_{table}_{geom}_rowid"));
            }
        }

        let sql = if self.has_spatial() {
            "SELECT m.name, m.type, g.f_geometry_column, g.type, \
                    CAST(g.coord_dimension AS TEXT), g.srid \
             FROM sqlite_master AS m \
             LEFT JOIN geometry_columns AS g ON lower(m.name) = lower(g.f_table_name) \
             WHERE m.type IN ('table', 'view') \
             ORDER BY m.name, g.f_geometry_column"
        } else {
            "SELECT name, type, NULL, NULL, NULL, NULL FROM sqlite_master \
             WHERE type IN ('table', 'view') ORDER BY name"
        };

        let mut stmt = self
            .connection()
            .prepare(sql)
            .map_err(|e| DbError::statement(e, sql))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GeoTable {
                    name: row.get(0)?,
                    kind: row.get(1)?,
                    geometry_column: row.get(2)?,
                    geometry_type: row.get(3)?,
                    dimension: row.get(4)?,
                    srid: row.get(5)?,
                    is_system: false,
                })
            })
            .map_err(|e| DbError::statement(e, sql))?;

        let mut tables = Vec::new();
        for row in rows {
            let mut table = row.map_err(|e| DbError::statement(e, sql))?;
            table.is_system = system.contains(&table.name);
            tables.push(table);
        }
        Ok(tables)
    }

    /// Number of rows in the table.
    pub fn get_table_row_count(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT count(*) FROM {}", quote_ident(table));
        self.connection()
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| DbError::statement(e, sql))
    }

    /// Column definitions of the table, one snapshot per column.
    pub fn get_table_fields(&self, table: &str) -> Result<Vec<TableAttribute>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = self
            .connection()
            .prepare(&sql)
            .map_err(|e| DbError::statement(e, &sql))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TableAttribute {
                    ordinal: row.get(0)?,
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    not_null: row.get(3)?,
                    default: row.get(4)?,
                    primary_key: row.get::<_, i32>(5)? > 0,
                })
            })
            .map_err(|e| DbError::statement(e, &sql))?;

        let mut attrs = Vec::new();
        for row in rows {
            attrs.push(row.map_err(|e| DbError::statement(e, &sql))?);
        }
        Ok(attrs)
    }

    /// Indexes of the table, each with the ordinals of the columns it covers.
    pub fn get_table_indexes(&self, table: &str) -> Result<Vec<TableIndex>> {
        let sql = format!("PRAGMA index_list({})", quote_ident(table));
        let mut stmt = self
            .connection()
            .prepare(&sql)
            .map_err(|e| DbError::statement(e, &sql))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            })
            .map_err(|e| DbError::statement(e, &sql))?;

        let mut listed = Vec::new();
        for row in rows {
            listed.push(row.map_err(|e| DbError::statement(e, &sql))?);
        }

        let mut indexes = Vec::new();
        for (ordinal, name, unique) in listed {
            let info_sql = format!("PRAGMA index_info({})", quote_ident(&name));
            let mut info_stmt = self
                .connection()
                .prepare(&info_sql)
                .map_err(|e| DbError::statement(e, &info_sql))?;
            let cols = info_stmt
                .query_map([], |row| row.get::<_, i32>(1))
                .map_err(|e| DbError::statement(e, &info_sql))?;

            let mut columns = Vec::new();
            for col in cols {
                columns.push(col.map_err(|e| DbError::statement(e, &info_sql))?);
            }
            indexes.push(TableIndex {
                ordinal,
                name,
                unique,
                columns,
            });
        }
        Ok(indexes)
    }

    /// Triggers defined on the table.
    pub fn get_table_triggers(&self, table: &str) -> Result<Vec<TableTrigger>> {
        let sql = "SELECT name, sql FROM sqlite_master WHERE tbl_name = ?1 AND type = 'trigger'";
        let mut stmt = self
            .connection()
            .prepare(sql)
            .map_err(|e| DbError::statement(e, sql))?;
        let rows = stmt
            .query_map([table], |row| {
                Ok(TableTrigger {
                    name: row.get(0)?,
                    definition: row.get(1)?,
                    enabled: true,
                })
            })
            .map_err(|e| DbError::statement(e, sql))?;

        let mut triggers = Vec::new();
        for row in rows {
            triggers.push(row.map_err(|e| DbError::statement(e, sql))?);
        }
        Ok(triggers)
    }

    /// Bounding box of a geometry column, computed from the rows themselves
    /// via the MBR aggregate functions rather than precomputed statistics.
    /// Returns `None` for an empty table.
    pub fn get_estimated_extent(&self, geometry_column: &str, table: &str) -> Result<Option<Extent>> {
        let geom = quote_ident(geometry_column);
        let sql = format!(
            "SELECT min(MbrMinX({geom})), min(MbrMinY({geom})), \
                    max(MbrMaxX({geom})), max(MbrMaxY({geom})) FROM {}",
            quote_ident(table)
        );
        let bounds: (Option<f64>, Option<f64>, Option<f64>, Option<f64>) = self
            .connection()
            .query_row(&sql, [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .map_err(|e| DbError::statement(e, sql))?;

        Ok(match bounds {
            (Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => Some(Extent {
                min_x,
                min_y,
                max_x,
                max_y,
            }),
            _ => None,
        })
    }

    /// Defining SQL of a view. Fails when no such view exists.
    pub fn get_view_definition(&self, view: &str) -> Result<String> {
        let sql = "SELECT sql FROM sqlite_master WHERE type = 'view' AND name = ?1";
        self.connection()
            .query_row(sql, [view], |row| row.get(0))
            .map_err(|e| DbError::statement(e, sql))
    }

    /// Human-readable name of a spatial reference system.
    pub fn get_srid_name(&self, srid: i32) -> Result<String> {
        let sql = "SELECT ref_sys_name FROM spatial_ref_sys WHERE srid = ?1";
        self.connection()
            .query_row(sql, [srid], |row| row.get(0))
            .map_err(|e| DbError::statement(e, sql))
    }
}
