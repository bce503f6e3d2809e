use rusqlite::types::{Value, ValueRef};

use crate::error::SqlShimError;
use crate::types::SqlValue;

/// Bind-side conversion: integers stay integers, booleans become 0/1,
/// everything else goes through SQLite's text/real/blob forms.
pub(crate) fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::Float(f) => Value::Real(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        SqlValue::Null => Value::Null,
        SqlValue::Json(jsval) => Value::Text(jsval.to_string()),
        SqlValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Fetch-side conversion from a raw SQLite value.
pub(crate) fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<SqlValue, SqlShimError> {
    match row.get_ref(idx) {
        Err(e) => Err(SqlShimError::SqliteError(e)),
        Ok(ValueRef::Null) => Ok(SqlValue::Null),
        Ok(ValueRef::Integer(i)) => Ok(SqlValue::Int(i)),
        Ok(ValueRef::Real(f)) => Ok(SqlValue::Float(f)),
        Ok(ValueRef::Text(bytes)) => {
            let s = String::from_utf8_lossy(bytes).into_owned();
            Ok(SqlValue::Text(s))
        }
        Ok(ValueRef::Blob(b)) => Ok(SqlValue::Blob(b.to_vec())),
    }
}
