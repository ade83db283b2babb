use chrono::NaiveDate;
use mysql_async::consts::ColumnType;
use mysql_async::{Column, Row, Value};

use crate::backend::{BufferedStream, NativeColumn};
use crate::error::BackendError;
use crate::types::NativeValue;

/// Collation id MySQL reports for binary (non-text) data.
const BINARY_CHARSET: u16 = 63;

fn is_binary_string(column: &Column) -> bool {
    column.character_set() == BINARY_CHARSET
        && matches!(
            column.column_type(),
            ColumnType::MYSQL_TYPE_TINY_BLOB
                | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
                | ColumnType::MYSQL_TYPE_LONG_BLOB
                | ColumnType::MYSQL_TYPE_BLOB
                | ColumnType::MYSQL_TYPE_VAR_STRING
                | ColumnType::MYSQL_TYPE_STRING
                | ColumnType::MYSQL_TYPE_VARCHAR
                | ColumnType::MYSQL_TYPE_BIT
                | ColumnType::MYSQL_TYPE_GEOMETRY
        )
}

/// `BIGINT UNSIGNED` values above `i64::MAX` have no integer counterpart and come back as
/// their exact decimal text.
fn unsigned_value(value: u64) -> NativeValue {
    i64::try_from(value).map_or_else(|_| NativeValue::Text(value.to_string()), NativeValue::Int)
}

/// Zero dates (`0000-00-00 ...`) have no calendar equivalent and come back as text.
fn date_value(y: u16, m: u8, d: u8, h: u8, mi: u8, s: u8, us: u32) -> NativeValue {
    NaiveDate::from_ymd_opt(i32::from(y), u32::from(m), u32::from(d))
        .and_then(|date| {
            date.and_hms_micro_opt(u32::from(h), u32::from(mi), u32::from(s), us)
        })
        .map_or_else(
            || NativeValue::Text(format!("{y:04}-{m:02}-{d:02} {h:02}:{mi:02}:{s:02}")),
            NativeValue::Timestamp,
        )
}

/// Convert one mysql value, using its column to tell text, binary and JSON bytes apart.
///
/// # Errors
///
/// Returns `BackendError::Conversion` for a JSON column holding invalid JSON.
pub fn mysql_extract_value(value: &Value, column: &Column) -> Result<NativeValue, BackendError> {
    Ok(match value {
        Value::NULL => NativeValue::DbNull,
        Value::Int(i) => NativeValue::Int(*i),
        Value::UInt(u) => unsigned_value(*u),
        Value::Float(f) => NativeValue::Float(f64::from(*f)),
        Value::Double(d) => NativeValue::Float(*d),
        Value::Date(y, m, d, h, mi, s, us) => date_value(*y, *m, *d, *h, *mi, *s, *us),
        Value::Time(negative, days, h, mi, s, us) => {
            let sign = if *negative { "-" } else { "" };
            let hours = u64::from(*days) * 24 + u64::from(*h);
            NativeValue::Text(format!("{sign}{hours:02}:{mi:02}:{s:02}.{us:06}"))
        }
        Value::Bytes(bytes) => {
            if column.column_type() == ColumnType::MYSQL_TYPE_JSON {
                NativeValue::Json(serde_json::from_slice(bytes).map_err(|e| {
                    BackendError::Conversion(format!(
                        "invalid JSON in column `{}`: {e}",
                        column.name_str()
                    ))
                })?)
            } else if is_binary_string(column) {
                NativeValue::Blob(bytes.clone())
            } else {
                String::from_utf8(bytes.clone())
                    .map_or_else(|e| NativeValue::Blob(e.into_bytes()), NativeValue::Text)
            }
        }
    })
}

/// Column metadata as reported by a prepared statement.
#[must_use]
pub fn native_columns(columns: &[Column]) -> Vec<NativeColumn> {
    columns
        .iter()
        .map(|col| NativeColumn::new(col.name_str(), format!("{:?}", col.column_type())))
        .collect()
}

/// Read all rows into a buffered stream described by `columns`.
///
/// # Errors
///
/// Returns errors from value conversion.
pub fn build_result_stream(
    columns: &[Column],
    rows: &[Row],
) -> Result<BufferedStream, BackendError> {
    let mut native_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut row_values = Vec::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let value = row.as_ref(idx).unwrap_or(&Value::NULL);
            row_values.push(mysql_extract_value(value, column)?);
        }
        native_rows.push(row_values);
    }
    Ok(BufferedStream::new(native_columns(columns), native_rows))
}
