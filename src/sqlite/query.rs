use rusqlite::types::Value;

use crate::backend::{BufferedStream, NativeColumn};
use crate::error::BackendError;
use crate::types::NativeValue;

/// Extract a native value from a `SQLite` row.
///
/// # Errors
///
/// Returns `BackendError::SqliteError` if the column cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> Result<NativeValue, BackendError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => NativeValue::DbNull,
        Value::Integer(i) => NativeValue::Int(i),
        Value::Real(f) => NativeValue::Float(f),
        Value::Text(s) => NativeValue::Text(s),
        Value::Blob(b) => NativeValue::Blob(b),
    })
}

fn storage_class(value: &NativeValue) -> &'static str {
    match value {
        NativeValue::Int(_) | NativeValue::Bool(_) => "INTEGER",
        NativeValue::Float(_) => "REAL",
        NativeValue::Blob(_) => "BLOB",
        NativeValue::DbNull => "NULL",
        NativeValue::Text(_) | NativeValue::Timestamp(_) | NativeValue::Json(_) => "TEXT",
    }
}

/// Run a prepared query and read all of its rows.
///
/// Column types are the declared types; expression columns without one fall back to the
/// storage class of their first non-null value, or `NULL`.
///
/// # Errors
///
/// Returns `BackendError::SqliteError` if execution or row extraction fails.
pub fn build_result_stream(
    stmt: &mut rusqlite::Statement<'_>,
    params: &[Value],
) -> Result<BufferedStream, BackendError> {
    let declared: Vec<(String, Option<String>)> = stmt
        .columns()
        .iter()
        .map(|col| (col.name().to_string(), col.decl_type().map(str::to_string)))
        .collect();
    let col_count = declared.len();

    let mut rows_iter = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        rows.push(row_values);
    }

    let columns = declared
        .into_iter()
        .enumerate()
        .map(|(idx, (name, decl_type))| {
            let type_name = decl_type.unwrap_or_else(|| {
                rows.iter()
                    .map(|row| &row[idx])
                    .find(|v| !v.is_db_null())
                    .map_or("NULL", storage_class)
                    .to_string()
            });
            NativeColumn::new(name, type_name)
        })
        .collect();

    Ok(BufferedStream::new(columns, rows))
}

/// Read a single integer from a one-row, one-column query.
pub(crate) fn query_scalar_i64(
    conn: &rusqlite::Connection,
    sql: &str,
) -> Result<i64, BackendError> {
    Ok(conn.query_row(sql, [], |row| row.get::<_, i64>(0))?)
}
