use rusqlite::types::Value;

use crate::types::NativeValue;

/// Convert a native value into the rusqlite value it binds as.
///
/// `SQLite` has no boolean, timestamp or JSON storage class: booleans bind as `0`/`1`,
/// timestamps as `YYYY-MM-DD HH:MM:SS[.fff]` text and JSON as its serialized text.
#[must_use]
pub fn native_to_sqlite_value(value: &NativeValue) -> Value {
    match value {
        NativeValue::DbNull => Value::Null,
        NativeValue::Int(i) => Value::Integer(*i),
        NativeValue::Float(f) => Value::Real(*f),
        NativeValue::Text(s) => Value::Text(s.clone()),
        NativeValue::Bool(b) => Value::Integer(i64::from(*b)),
        NativeValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        NativeValue::Json(jval) => Value::Text(jval.to_string()),
        NativeValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Bound parameters of one statement.
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: &[NativeValue]) -> Self {
        Params(params.iter().map(native_to_sqlite_value).collect())
    }

    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn null_and_bool_conversions() {
        assert_eq!(native_to_sqlite_value(&NativeValue::DbNull), Value::Null);
        assert_eq!(native_to_sqlite_value(&NativeValue::Bool(true)), Value::Integer(1));
    }

    #[test]
    fn timestamp_binds_as_text() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            native_to_sqlite_value(&NativeValue::Timestamp(dt)),
            Value::Text("2024-05-17 08:30:00".into())
        );
    }
}
