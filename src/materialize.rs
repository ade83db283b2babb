//! Conversion between driver-side [`NativeValue`]s and caller-facing [`RowValues`].
//!
//! Every fetch path of a cursor goes through [`materialize_row`], so backend NULL sentinels
//! are normalized the same way no matter how rows are pulled.

use crate::types::{NativeValue, RowValues};

/// Replace the backend NULL sentinel with [`RowValues::Null`]; everything else passes through.
#[must_use]
pub fn materialize_value(value: NativeValue) -> RowValues {
    match value {
        NativeValue::DbNull => RowValues::Null,
        NativeValue::Int(i) => RowValues::Int(i),
        NativeValue::Float(f) => RowValues::Float(f),
        NativeValue::Text(s) => RowValues::Text(s),
        NativeValue::Bool(b) => RowValues::Bool(b),
        NativeValue::Timestamp(dt) => RowValues::Timestamp(dt),
        NativeValue::Json(j) => RowValues::JSON(j),
        NativeValue::Blob(b) => RowValues::Blob(b),
    }
}

/// Materialize a whole native row, keeping its arity.
#[must_use]
pub fn materialize_row(native: Vec<NativeValue>) -> Vec<RowValues> {
    native.into_iter().map(materialize_value).collect()
}

/// Translate a caller parameter into the value a driver binds; `Null` becomes `DbNull`.
#[must_use]
pub fn bind_value(value: &RowValues) -> NativeValue {
    match value {
        RowValues::Null => NativeValue::DbNull,
        RowValues::Int(i) => NativeValue::Int(*i),
        RowValues::Float(f) => NativeValue::Float(*f),
        RowValues::Text(s) => NativeValue::Text(s.clone()),
        RowValues::Bool(b) => NativeValue::Bool(*b),
        RowValues::Timestamp(dt) => NativeValue::Timestamp(*dt),
        RowValues::JSON(j) => NativeValue::Json(j.clone()),
        RowValues::Blob(b) => NativeValue::Blob(b.clone()),
    }
}
