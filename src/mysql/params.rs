use chrono::{Datelike, NaiveDateTime, Timelike};
use mysql_async::{Params, Value};

use crate::types::NativeValue;

#[allow(clippy::cast_possible_truncation)]
fn datetime_value(dt: &NaiveDateTime) -> Value {
    Value::Date(
        u16::try_from(dt.year()).unwrap_or_default(),
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
        dt.nanosecond() / 1_000,
    )
}

/// Convert a native value into the mysql value it binds as.
#[must_use]
pub fn native_to_mysql_value(value: &NativeValue) -> Value {
    match value {
        NativeValue::DbNull => Value::NULL,
        NativeValue::Int(i) => Value::Int(*i),
        NativeValue::Float(f) => Value::Double(*f),
        NativeValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
        NativeValue::Bool(b) => Value::Int(i64::from(*b)),
        NativeValue::Timestamp(dt) => datetime_value(dt),
        NativeValue::Json(jval) => Value::Bytes(jval.to_string().into_bytes()),
        NativeValue::Blob(bytes) => Value::Bytes(bytes.clone()),
    }
}

/// Positional parameters for one statement.
#[must_use]
pub fn convert(params: &[NativeValue]) -> Params {
    if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(params.iter().map(native_to_mysql_value).collect())
    }
}
