//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::connection::DatabaseConnection;
pub use crate::error::SqlShimError;
pub use crate::expansion::{ExpandedStatement, expand_statement};
pub use crate::params;
pub use crate::results::{DbRow, ResultSet};
pub use crate::types::{DatabaseType, ParamValue, SqlValue};

#[cfg(feature = "postgres")]
pub use crate::postgres::ConnectionSettings;
