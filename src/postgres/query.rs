use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::{Row, Statement};

use crate::backend::{BufferedStream, NativeColumn};
use crate::error::BackendError;
use crate::types::NativeValue;

/// Extract a native value from a `tokio_postgres` row, with SQL NULL as `DbNull`.
///
/// # Errors
///
/// Returns `BackendError::PostgresError` if the column cannot be read, or
/// `BackendError::Conversion` for a column type with no native counterpart.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<NativeValue, BackendError> {
    let type_info = row.columns()[idx].type_();

    let value = match *type_info {
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| NativeValue::Int(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| NativeValue::Int(i64::from(v))),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(NativeValue::Int),
        Type::OID => row
            .try_get::<_, Option<u32>>(idx)?
            .map(|v| NativeValue::Int(i64::from(v))),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| NativeValue::Float(f64::from(v))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(NativeValue::Float),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(NativeValue::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(NativeValue::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| NativeValue::Timestamp(v.naive_utc())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| NativeValue::Timestamp(v.and_time(NaiveTime::MIN))),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<Value>>(idx)?.map(NativeValue::Json),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(NativeValue::Blob),
        _ if <String as FromSql>::accepts(type_info) => {
            row.try_get::<_, Option<String>>(idx)?.map(NativeValue::Text)
        }
        _ => {
            return Err(BackendError::Conversion(format!(
                "unsupported PostgreSQL column type `{}`",
                type_info.name()
            )));
        }
    };
    Ok(value.unwrap_or(NativeValue::DbNull))
}

/// Build a buffered stream using statement metadata for the columns, so an empty result
/// still describes itself.
///
/// # Errors
///
/// Returns errors from row value extraction.
pub fn build_result_stream(stmt: &Statement, rows: &[Row]) -> Result<BufferedStream, BackendError> {
    let columns: Vec<NativeColumn> = stmt
        .columns()
        .iter()
        .map(|col| NativeColumn::new(col.name(), col.type_().name()))
        .collect();
    let column_count = columns.len();

    let mut native_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        native_rows.push(row_values);
    }

    Ok(BufferedStream::new(columns, native_rows))
}
