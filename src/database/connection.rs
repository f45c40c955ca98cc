//! SpatiaLite connection management
//!
//! `SpatialiteConn` wraps one `rusqlite::Connection` to an embedded spatial
//! database file. The handle is opened at construction, stays open for the
//! connection's lifetime and is exclusively owned; everything runs
//! synchronously on the calling thread. Introspection and DDL operations
//! live in the `introspect` and `ddl` modules as further impl blocks.

use rusqlite::Connection;
use tracing::{debug, info};

use super::error::{DbError, Result};
use super::types::SpatialInfo;

/// Default name of the SpatiaLite loadable module.
pub const SPATIALITE_MODULE: &str = "mod_spatialite";

/// Connection to one SpatiaLite (or plain SQLite) database.
pub struct SpatialiteConn {
    path: Option<String>,
    conn: Connection,
    has_geometry_columns: bool,
}

impl SpatialiteConn {
    /// Open the database at the given path, probing for spatial support.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::Open {
            path: path.to_string(),
            source: e,
        })?;
        Ok(Self::attach(conn, Some(path.to_string())))
    }

    /// Open an in-memory database. Mostly useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::Open {
            path: ":memory:".to_string(),
            source: e,
        })?;
        Ok(Self::attach(conn, None))
    }

    fn attach(conn: Connection, path: Option<String>) -> Self {
        let mut db = SpatialiteConn {
            path,
            conn,
            has_geometry_columns: false,
        };
        let spatial = db.check_spatial();
        info!(
            "opened database {} (spatial metadata: {})",
            db.path.as_deref().unwrap_or(":memory:"),
            spatial
        );
        db
    }

    /// Path of the underlying database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Access the raw driver handle, e.g. to run ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether the spatial metadata catalog is available.
    pub fn has_spatial(&self) -> bool {
        self.has_geometry_columns
    }

    /// Probe for spatial support and refresh the cached flag.
    ///
    /// Tries `CheckSpatialMetaData()` first. When the probe fails (the
    /// extension is not loaded in-process) the database is NOT treated as an
    /// error case: if the `geometry_columns` catalog table exists the
    /// database still counts as spatial so introspection keeps working,
    /// otherwise it is a plain database.
    pub fn check_spatial(&mut self) -> bool {
        let probe: rusqlite::Result<i64> =
            self.conn
                .query_row("SELECT CheckSpatialMetaData()", [], |row| row.get(0));

        self.has_geometry_columns = match probe {
            Ok(code) => code > 0,
            Err(e) => {
                debug!("spatial metadata probe failed ({}), checking catalog", e);
                self.conn
                    .query_row(
                        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'geometry_columns'",
                        [],
                        |row| row.get::<_, i64>(0),
                    )
                    .map(|n| n > 0)
                    .unwrap_or(false)
            }
        };
        self.has_geometry_columns
    }

    /// Load the SpatiaLite loadable module into this connection and re-probe
    /// spatial support. Pass `None` to use the default module name and let
    /// the platform library path resolve it.
    pub fn load_spatial_extension(&mut self, library: Option<&str>) -> Result<()> {
        let library = library.unwrap_or(SPATIALITE_MODULE);
        // SAFETY: extension loading runs library initialization code
        // in-process; only the caller-supplied SpatiaLite module is passed
        // through, and loading is disabled again when the guard drops.
        unsafe {
            let _guard = rusqlite::LoadExtensionGuard::new(&self.conn).map_err(DbError::driver)?;
            self.conn
                .load_extension(library, None::<&str>)
                .map_err(DbError::driver)?;
        }
        info!("loaded spatial extension '{}'", library);
        self.check_spatial();
        Ok(())
    }

    /// Database engine version string.
    pub fn get_info(&self) -> Result<String> {
        let sql = "SELECT sqlite_version()";
        self.conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| DbError::statement(e, sql))
    }

    /// SpatiaLite library versions. Only meaningful when [`Self::has_spatial`]
    /// is true; on a plain database the statement simply fails.
    pub fn get_spatial_info(&self) -> Result<SpatialInfo> {
        let sql = "SELECT spatialite_version(), geos_version(), proj4_version()";
        self.conn
            .query_row(sql, [], |row| {
                Ok(SpatialInfo {
                    library_version: row.get(0)?,
                    geos_version: row.get(1)?,
                    proj_version: row.get(2)?,
                })
            })
            .map_err(|e| DbError::statement(e, sql))
    }

    /// Begin a transaction for batch operations, e.g. bulk row inserts.
    ///
    /// Nothing executed on the transaction is committed until
    /// `Transaction::commit` is called; dropping it rolls back.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        self.conn.unchecked_transaction().map_err(DbError::driver)
    }

    /// Execute one generated statement.
    ///
    /// SpatiaLite administration functions are invoked through `SELECT`, so
    /// statements that produce rows are drained instead of rejected. On
    /// failure the error carries the statement text; autocommit mode means
    /// there is no aborted transaction left behind and the handle stays
    /// usable.
    pub(super) fn run_sql(&self, sql: &str) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DbError::statement(e, sql))?;
        if stmt.column_count() == 0 {
            stmt.execute([]).map_err(|e| DbError::statement(e, sql))?;
        } else {
            let mut rows = stmt.query([]).map_err(|e| DbError::statement(e, sql))?;
            while rows
                .next()
                .map_err(|e| DbError::statement(e, sql))?
                .is_some()
            {}
        }
        Ok(())
    }

    /// Execute several statements inside one transaction.
    ///
    /// The whole batch commits or rolls back together; the error carries the
    /// text of the statement that failed.
    pub(super) fn run_batch(&self, statements: &[String]) -> Result<()> {
        let tx = self.conn.unchecked_transaction().map_err(DbError::driver)?;
        for sql in statements {
            let mut stmt = tx.prepare(sql).map_err(|e| DbError::statement(e, sql))?;
            if stmt.column_count() == 0 {
                stmt.execute([]).map_err(|e| DbError::statement(e, sql))?;
            } else {
                let mut rows = stmt.query([]).map_err(|e| DbError::statement(e, sql))?;
                while rows
                    .next()
                    .map_err(|e| DbError::statement(e, sql))?
                    .is_some()
                {}
            }
        }
        tx.commit().map_err(DbError::driver)
    }
}
