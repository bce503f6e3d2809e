//! The connection handle and the two query shapes built on it.

use crate::error::SqlShimError;
use crate::expansion::expand_statement;
use crate::results::{DbRow, ResultSet};
use crate::types::{DatabaseType, ParamValue};

#[cfg(feature = "sqlite")]
use std::path::Path;

/// A single, exclusively owned database connection.
///
/// All calls are synchronous and block until the driver completes; the handle
/// is not re-entrant across threads and carries no retry, timeout, or
/// cancellation logic. Buffered query mode (the whole result set materialized
/// client-side before iteration) is the default.
///
/// ```rust,no_run
/// use sql_shim::prelude::*;
///
/// # fn demo() -> Result<(), SqlShimError> {
/// let mut conn = DatabaseConnection::open_sqlite_in_memory()?;
/// let rows = conn.query_select(
///     "SELECT name FROM users WHERE id IN (:ids)",
///     &params!("ids" => vec![1i64, 2, 3]),
/// )?;
/// # let _ = rows;
/// # Ok(())
/// # }
/// ```
pub enum DatabaseConnection {
    #[cfg(feature = "postgres")]
    Postgres {
        client: postgres::Client,
        buffered: bool,
    },
    #[cfg(feature = "sqlite")]
    Sqlite {
        conn: rusqlite::Connection,
        buffered: bool,
    },
}

impl DatabaseConnection {
    /// Connect to Postgres with the given settings.
    ///
    /// # Errors
    ///
    /// Returns `SqlShimError::ConfigError` for missing settings, or the
    /// driver's native error if the handshake fails.
    #[cfg(feature = "postgres")]
    pub fn connect_postgres(
        settings: &crate::postgres::ConnectionSettings,
    ) -> Result<Self, SqlShimError> {
        let client = crate::postgres::config::connect(settings)?;
        Ok(DatabaseConnection::Postgres {
            client,
            buffered: true,
        })
    }

    /// Open a file-backed SQLite database.
    ///
    /// # Errors
    ///
    /// Returns the driver's native error if the file cannot be opened.
    #[cfg(feature = "sqlite")]
    pub fn open_sqlite(db_path: impl AsRef<Path>) -> Result<Self, SqlShimError> {
        let conn = crate::sqlite::config::open(db_path.as_ref())?;
        Ok(DatabaseConnection::Sqlite {
            conn,
            buffered: true,
        })
    }

    /// Open a fresh in-memory SQLite database.
    ///
    /// # Errors
    ///
    /// Returns the driver's native error if the database cannot be created.
    #[cfg(feature = "sqlite")]
    pub fn open_sqlite_in_memory() -> Result<Self, SqlShimError> {
        let conn = crate::sqlite::config::open_in_memory()?;
        Ok(DatabaseConnection::Sqlite {
            conn,
            buffered: true,
        })
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "postgres")]
            DatabaseConnection::Postgres { .. } => DatabaseType::Postgres,
            #[cfg(feature = "sqlite")]
            DatabaseConnection::Sqlite { .. } => DatabaseType::Sqlite,
        }
    }

    /// Toggle buffered query mode. Buffered mode materializes the entire
    /// result set client-side before rows reach the caller; unbuffered mode
    /// decodes row by row.
    pub fn use_buffered_query(&mut self, status: bool) {
        match self {
            #[cfg(feature = "postgres")]
            DatabaseConnection::Postgres { buffered, .. } => *buffered = status,
            #[cfg(feature = "sqlite")]
            DatabaseConnection::Sqlite { buffered, .. } => *buffered = status,
        }
    }

    /// Do a SELECT query, returning every matched row.
    ///
    /// List-valued parameters are expanded into numbered placeholders before
    /// execution. An empty result set is a value, not an error.
    ///
    /// # Errors
    ///
    /// Statement preparation, binding, and row-decoding failures propagate as
    /// the driver's native error.
    pub fn query_select(
        &mut self,
        query: &str,
        values: &[(String, ParamValue)],
    ) -> Result<ResultSet, SqlShimError> {
        let rows = self.select_rows(query, values, &mut Some)?;
        let mut result_set = ResultSet::with_capacity(rows.len());
        for row in rows {
            result_set.add_row(row);
        }
        Ok(result_set)
    }

    /// Do a SELECT query expected to yield one row, returning the last row
    /// collected (or `None` when nothing matched).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::query_select`].
    pub fn query_select_one(
        &mut self,
        query: &str,
        values: &[(String, ParamValue)],
    ) -> Result<Option<DbRow>, SqlShimError> {
        let mut rows = self.select_rows(query, values, &mut Some)?;
        Ok(rows.pop())
    }

    /// Do a SELECT query, applying `transform` to each row and discarding
    /// rows for which it returns `None`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::query_select`].
    pub fn query_select_map<T>(
        &mut self,
        query: &str,
        values: &[(String, ParamValue)],
        mut transform: impl FnMut(DbRow) -> Option<T>,
    ) -> Result<Vec<T>, SqlShimError> {
        self.select_rows(query, values, &mut transform)
    }

    /// Like [`Self::query_select_map`], returning only the last element the
    /// transform kept.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::query_select`].
    pub fn query_select_one_map<T>(
        &mut self,
        query: &str,
        values: &[(String, ParamValue)],
        mut transform: impl FnMut(DbRow) -> Option<T>,
    ) -> Result<Option<T>, SqlShimError> {
        let mut mapped = self.select_rows(query, values, &mut transform)?;
        Ok(mapped.pop())
    }

    /// Execute a mutation query, returning whether execution succeeded.
    ///
    /// # Errors
    ///
    /// Statement preparation and binding failures propagate as the driver's
    /// native error; a failure of the execution step itself returns
    /// `Ok(false)`.
    pub fn query_execute(
        &mut self,
        query: &str,
        values: &[(String, ParamValue)],
    ) -> Result<bool, SqlShimError> {
        let statement = expand_statement(query, values)?;
        tracing::debug!(sql = %statement.sql, params = statement.bindings.len(), "executing statement");
        match self {
            #[cfg(feature = "postgres")]
            DatabaseConnection::Postgres { client, .. } => {
                crate::postgres::executor::execute_dml(client, &statement)
            }
            #[cfg(feature = "sqlite")]
            DatabaseConnection::Sqlite { conn, .. } => {
                crate::sqlite::executor::execute_dml(conn, &statement)
            }
        }
    }

    /// Execute a batch of statements (no parameters), e.g. for schema setup.
    ///
    /// # Errors
    ///
    /// Driver failures propagate untouched.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlShimError> {
        match self {
            #[cfg(feature = "postgres")]
            DatabaseConnection::Postgres { client, .. } => {
                crate::postgres::executor::execute_batch(client, sql)
            }
            #[cfg(feature = "sqlite")]
            DatabaseConnection::Sqlite { conn, .. } => {
                crate::sqlite::executor::execute_batch(conn, sql)
            }
        }
    }

    fn select_rows<T>(
        &mut self,
        query: &str,
        values: &[(String, ParamValue)],
        transform: &mut dyn FnMut(DbRow) -> Option<T>,
    ) -> Result<Vec<T>, SqlShimError> {
        let statement = expand_statement(query, values)?;
        tracing::debug!(sql = %statement.sql, params = statement.bindings.len(), "executing select");
        match self {
            #[cfg(feature = "postgres")]
            DatabaseConnection::Postgres { client, buffered } => {
                crate::postgres::executor::select_rows(client, &statement, *buffered, transform)
            }
            #[cfg(feature = "sqlite")]
            DatabaseConnection::Sqlite { conn, buffered } => {
                crate::sqlite::executor::select_rows(conn, &statement, *buffered, transform)
            }
        }
    }
}
