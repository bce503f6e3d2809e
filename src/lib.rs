//! Lightweight synchronous wrappers for rusqlite and postgres with
//! named-parameter list expansion.
//!
//! The crate is a thin convenience layer over the drivers: it opens a
//! connection, expands list-valued named parameters into comma-separated
//! placeholder lists, binds each scalar with a driver-appropriate type, and
//! exposes two query shapes — row-fetching SELECT (with optional per-row
//! transform/filter) and fire-and-forget EXECUTE. Driver errors propagate
//! untouched; there is no pooling, retry, or transaction management.
//!
//! ```rust,no_run
//! use sql_shim::prelude::*;
//!
//! # fn demo() -> Result<(), SqlShimError> {
//! let mut conn = DatabaseConnection::open_sqlite_in_memory()?;
//! conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//! let inserted = conn.query_execute(
//!     "INSERT INTO users (id, name) VALUES (:id, :name)",
//!     &params!("id" => 1i64, "name" => "alice"),
//! )?;
//! assert!(inserted);
//!
//! let names = conn.query_select_map(
//!     "SELECT name FROM users WHERE id IN (:ids)",
//!     &params!("ids" => vec![1i64, 2]),
//!     |row| row.get("name").and_then(SqlValue::as_text).map(str::to_string),
//! )?;
//! # let _ = names;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod expansion;
mod macros;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use crate::connection::DatabaseConnection;
pub use crate::error::SqlShimError;
pub use crate::expansion::{ExpandedStatement, expand_statement, normalize_name};
pub use crate::results::{DbRow, ResultSet};
pub use crate::types::{DatabaseType, ParamValue, SqlValue};

#[cfg(feature = "postgres")]
pub use crate::postgres::ConnectionSettings;
