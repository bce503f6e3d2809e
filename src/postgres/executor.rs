use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use postgres::Client;
use postgres::fallible_iterator::FallibleIterator;
use postgres::types::ToSql;
use serde_json::Value as JsonValue;

use crate::error::SqlShimError;
use crate::expansion::ExpandedStatement;
use crate::postgres::params::Params;
use crate::postgres::positional::to_positional;
use crate::results::{DbRow, column_lookup};
use crate::types::SqlValue;

/// Run a SELECT-shaped statement, feeding each row through `transform` and
/// keeping the rows it maps to `Some`.
///
/// Preparation and parameter errors propagate, including client-side
/// conversion failures while binding. When the server rejects execution of
/// the prepared statement, the result is empty; row-decoding errors
/// propagate.
pub(crate) fn select_rows<T>(
    client: &mut Client,
    statement: &ExpandedStatement,
    buffered: bool,
    transform: &mut dyn FnMut(DbRow) -> Option<T>,
) -> Result<Vec<T>, SqlShimError> {
    let (sql, values) = to_positional(statement)?;
    let prepared = client.prepare(&sql)?;

    let column_names: Arc<Vec<String>> = Arc::new(
        prepared
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect(),
    );
    let lookup = Arc::new(column_lookup(&column_names));

    let mut out = Vec::new();
    if buffered {
        let params = Params::convert(&values);
        let rows = match client.query(&prepared, params.as_refs()) {
            Ok(rows) => rows,
            Err(err) if err.as_db_error().is_some() => {
                tracing::warn!(error = %err, "statement failed to execute");
                return Ok(out);
            }
            // Client-side failures (parameter conversion, connection loss)
            // are not an execution rejection.
            Err(err) => return Err(err.into()),
        };
        for row in &rows {
            let row_values = extract_row(row, column_names.len())?;
            let db_row = DbRow::with_lookup(column_names.clone(), lookup.clone(), row_values);
            if let Some(mapped) = transform(db_row) {
                out.push(mapped);
            }
        }
    } else {
        let mut rows = match client.query_raw(
            &prepared,
            values.iter().map(|v| v as &(dyn ToSql + Sync)),
        ) {
            Ok(rows) => rows,
            Err(err) if err.as_db_error().is_some() => {
                tracing::warn!(error = %err, "statement failed to execute");
                return Ok(out);
            }
            Err(err) => return Err(err.into()),
        };
        while let Some(row) = rows.next()? {
            let row_values = extract_row(&row, column_names.len())?;
            let db_row = DbRow::with_lookup(column_names.clone(), lookup.clone(), row_values);
            if let Some(mapped) = transform(db_row) {
                out.push(mapped);
            }
        }
    }
    Ok(out)
}

/// Run a mutation statement. Preparation and parameter errors propagate,
/// including client-side conversion failures while binding; a server-reported
/// execution failure returns `false`.
pub(crate) fn execute_dml(
    client: &mut Client,
    statement: &ExpandedStatement,
) -> Result<bool, SqlShimError> {
    let (sql, values) = to_positional(statement)?;
    let prepared = client.prepare(&sql)?;
    let params = Params::convert(&values);
    match client.execute(&prepared, params.as_refs()) {
        Ok(_) => Ok(true),
        Err(err) if err.as_db_error().is_some() => {
            tracing::warn!(error = %err, "statement execution failed");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// Execute a batch of statements in a single simple-query round trip.
pub(crate) fn execute_batch(client: &mut Client, sql: &str) -> Result<(), SqlShimError> {
    client.batch_execute(sql)?;
    Ok(())
}

fn extract_row(row: &postgres::Row, columns: usize) -> Result<Vec<SqlValue>, SqlShimError> {
    let mut values = Vec::with_capacity(columns);
    for idx in 0..columns {
        values.push(extract_value(row, idx)?);
    }
    Ok(values)
}

/// Extract a `SqlValue` from a row at the given index, dispatching on the
/// column's declared type.
fn extract_value(row: &postgres::Row, idx: usize) -> Result<SqlValue, SqlShimError> {
    let type_name = row.columns()[idx].type_().name().to_string();
    match type_name.as_str() {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Int))
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Float(f64::from(v))))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Bool))
        }
        "timestamp" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Timestamp))
        }
        "timestamptz" => {
            let val: Option<DateTime<Utc>> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Timestamp(v.naive_utc())))
        }
        "json" | "jsonb" => {
            let val: Option<JsonValue> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Json))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Blob))
        }
        // For other types, attempt to get as string
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Text))
        }
    }
}
