use std::collections::HashMap;
use std::sync::Arc;

use crate::types::SqlValue;

/// A row from a database query result
///
/// Column names are shared across all rows of one statement, together with a
/// name-to-index lookup so repeated `get` calls avoid string scans.
#[derive(Debug, Clone)]
pub struct DbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<SqlValue>,
    column_lookup: Arc<HashMap<String, usize>>,
}

impl DbRow {
    /// Create a new database row, building the column lookup from the names.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<SqlValue>) -> Self {
        let lookup = Arc::new(column_lookup(&column_names));
        Self {
            column_names,
            values,
            column_lookup: lookup,
        }
    }

    /// Create a row reusing a lookup built once per statement.
    pub(crate) fn with_lookup(
        column_names: Arc<Vec<String>>,
        column_lookup: Arc<HashMap<String, usize>>,
        values: Vec<SqlValue>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_lookup,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_lookup.get(column_name) {
            return Some(idx);
        }

        // Fall back to linear search
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }
}

/// Build the name-to-index map shared by every row of a statement.
pub(crate) fn column_lookup(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

/// A result set from a database query
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<DbRow>,
    /// The number of rows collected
    pub rows_affected: usize,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            rows_affected: 0,
        }
    }

    /// Add a row to the result set
    pub fn add_row(&mut self, row: DbRow) {
        self.results.push(row);
        self.rows_affected += 1;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }
}
