use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;

/// Errors surfaced by the shim.
///
/// Driver errors are wrapped transparently and never translated; the layer
/// adds no retry or recovery of its own.
#[derive(Debug, Error)]
pub enum SqlShimError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}
