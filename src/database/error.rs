//! Typed errors for the database connector
//!
//! Statement failures carry the offending SQL text whenever one exists, so
//! callers can log or display enough context without re-deriving it.

use thiserror::Error;

/// Result alias used throughout the database module.
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors raised by the SpatiaLite connector.
#[derive(Debug, Error)]
pub enum DbError {
    /// The requested named connection profile is not defined in the settings
    /// store.
    #[error("there is no defined database connection \"{0}\"")]
    UnknownConnection(String),

    /// A connection profile exists but carries no database path.
    #[error("connection \"{0}\" has no sqlitepath entry")]
    MissingDatabasePath(String),

    /// The settings store could not be read or parsed.
    #[error("failed to load connection settings: {0}")]
    Settings(String),

    /// The database file could not be opened.
    #[error("failed to open database at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed during introspection or DDL execution.
    #[error("{message}")]
    Execution {
        message: String,
        /// The SQL text that triggered the failure, when one is associated.
        query: Option<String>,
    },
}

impl DbError {
    /// Wrap a driver error together with the statement that triggered it.
    pub fn statement(error: rusqlite::Error, sql: impl Into<String>) -> Self {
        DbError::Execution {
            message: error.to_string(),
            query: Some(sql.into()),
        }
    }

    /// Wrap a driver error that arose without an associated statement.
    pub fn driver(error: rusqlite::Error) -> Self {
        DbError::Execution {
            message: error.to_string(),
            query: None,
        }
    }

    /// The SQL text associated with this error, if any.
    pub fn query(&self) -> Option<&str> {
        match self {
            DbError::Execution { query, .. } => query.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_error_carries_query() {
        let err = DbError::statement(
            rusqlite::Error::QueryReturnedNoRows,
            "SELECT sql FROM sqlite_master",
        );
        assert_eq!(err.query(), Some("SELECT sql FROM sqlite_master"));
    }

    #[test]
    fn test_unknown_connection_display() {
        let err = DbError::UnknownConnection("parks".to_string());
        assert_eq!(
            err.to_string(),
            "there is no defined database connection \"parks\""
        );
        assert_eq!(err.query(), None);
    }
}
