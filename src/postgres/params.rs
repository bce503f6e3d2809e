use std::error::Error;

use bytes::BytesMut;
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};

use crate::types::SqlValue;

/// Container for Postgres parameters with lifetime tracking
pub(crate) struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow a slice of values as driver parameters.
    pub(crate) fn convert(values: &'a [SqlValue]) -> Params<'a> {
        let references: Vec<&(dyn ToSql + Sync)> =
            values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    pub(crate) fn as_refs(&self) -> &[&'a (dyn ToSql + Sync)] {
        &self.references
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            // Narrow to the column's integer width; out-of-range values fail
            // rather than truncate.
            SqlValue::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            SqlValue::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql(ty, out),
            },
            SqlValue::Text(s) => s.to_sql(ty, out),
            SqlValue::Bool(b) => b.to_sql(ty, out),
            SqlValue::Timestamp(dt) => dt.to_sql(ty, out),
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Json(jsval) => jsval.to_sql(ty, out),
            SqlValue::Blob(bytes) => bytes.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        match *ty {
            // Integer types
            Type::INT2 | Type::INT4 | Type::INT8 => true,
            // Floating point types
            Type::FLOAT4 | Type::FLOAT8 => true,
            // Text types
            Type::TEXT | Type::VARCHAR | Type::CHAR | Type::NAME => true,
            // Boolean type
            Type::BOOL => true,
            // Date/time types
            Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::DATE => true,
            // JSON types
            Type::JSON | Type::JSONB => true,
            // Binary data
            Type::BYTEA => true,
            _ => false,
        }
    }

    to_sql_checked!();
}
