use std::sync::Arc;

use rusqlite::Connection;

use crate::error::SqlShimError;
use crate::expansion::ExpandedStatement;
use crate::results::{DbRow, column_lookup};
use crate::sqlite::params;
use crate::types::SqlValue;

fn bind(
    prepared: &mut rusqlite::Statement<'_>,
    bindings: &[(String, SqlValue)],
) -> Result<(), SqlShimError> {
    for (name, value) in bindings {
        let index = prepared.parameter_index(name)?.ok_or_else(|| {
            SqlShimError::ParameterError(format!(
                "placeholder {name} is not present in the statement"
            ))
        })?;
        prepared.raw_bind_parameter(index, params::to_sqlite_value(value))?;
    }

    // The raw API leaves unbound parameters NULL instead of erroring, so an
    // unbound placeholder has to be caught here.
    let expected = prepared.parameter_count();
    if expected != bindings.len() {
        let unbound = (1..=expected)
            .filter_map(|index| prepared.parameter_name(index))
            .find(|name| !bindings.iter().any(|(bound, _)| bound == name))
            .unwrap_or("?");
        return Err(SqlShimError::ParameterError(format!(
            "no value bound for placeholder {unbound}"
        )));
    }
    Ok(())
}

/// Run a SELECT-shaped statement, feeding each row through `transform` and
/// keeping the rows it maps to `Some`.
///
/// Preparation and binding errors propagate. An execution failure before the
/// first row yields an empty result; errors while stepping subsequent rows
/// propagate as driver errors.
pub(crate) fn select_rows<T>(
    conn: &Connection,
    statement: &ExpandedStatement,
    buffered: bool,
    transform: &mut dyn FnMut(DbRow) -> Option<T>,
) -> Result<Vec<T>, SqlShimError> {
    let mut prepared = conn.prepare(&statement.sql)?;
    bind(&mut prepared, &statement.bindings)?;

    let column_names: Arc<Vec<String>> = Arc::new(
        prepared
            .column_names()
            .iter()
            .map(ToString::to_string)
            .collect(),
    );
    let lookup = Arc::new(column_lookup(&column_names));

    let mut out = Vec::new();
    // In buffered mode the whole result set is materialized before any row
    // reaches the transform.
    let mut pending: Vec<DbRow> = Vec::new();
    let mut rows = prepared.raw_query();
    let mut fetched = 0usize;
    loop {
        match rows.next() {
            Ok(Some(row)) => {
                fetched += 1;
                let mut values = Vec::with_capacity(column_names.len());
                for idx in 0..column_names.len() {
                    values.push(params::extract_value(row, idx)?);
                }
                let db_row = DbRow::with_lookup(column_names.clone(), lookup.clone(), values);
                if buffered {
                    pending.push(db_row);
                } else if let Some(mapped) = transform(db_row) {
                    out.push(mapped);
                }
            }
            Ok(None) => break,
            Err(err) if fetched == 0 => {
                tracing::warn!(error = %err, "statement failed to execute");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        }
    }

    for db_row in pending {
        if let Some(mapped) = transform(db_row) {
            out.push(mapped);
        }
    }
    Ok(out)
}

/// Run a mutation statement. Preparation and binding errors propagate; a
/// failure in the execution step itself returns `false`.
pub(crate) fn execute_dml(
    conn: &Connection,
    statement: &ExpandedStatement,
) -> Result<bool, SqlShimError> {
    let mut prepared = conn.prepare(&statement.sql)?;
    bind(&mut prepared, &statement.bindings)?;
    match prepared.raw_execute() {
        Ok(_) => Ok(true),
        Err(err) => {
            tracing::warn!(error = %err, "statement execution failed");
            Ok(false)
        }
    }
}

/// Execute a batch of statements inside a transaction.
pub(crate) fn execute_batch(conn: &mut Connection, sql: &str) -> Result<(), SqlShimError> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.commit()?;
    Ok(())
}
