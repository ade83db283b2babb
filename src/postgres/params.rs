use std::error::Error;

use serde_json::Value as JsonValue;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::NativeValue;

type SqlResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

fn is_text(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN)
}

fn mismatch(kind: &str, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {kind} value to PostgreSQL type `{}`", ty.name()).into()
}

fn int_to_sql(value: i64, ty: &Type, out: &mut bytes::BytesMut) -> SqlResult {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::OID => u32::try_from(value)?.to_sql(ty, out),
        #[allow(clippy::cast_precision_loss)]
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        #[allow(clippy::cast_precision_loss)]
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::BOOL => (value != 0).to_sql(ty, out),
        _ if is_text(ty) => value.to_string().to_sql(ty, out),
        _ => Err(mismatch("integer", ty)),
    }
}

/// Parameters are adapted to the type the server inferred for each placeholder, so an
/// `Int` binds to `int2`/`int4`/`int8` columns alike.
impl ToSql for NativeValue {
    fn to_sql(&self, ty: &Type, out: &mut bytes::BytesMut) -> SqlResult {
        match self {
            NativeValue::DbNull => Ok(IsNull::Yes),
            NativeValue::Int(i) => int_to_sql(*i, ty, out),
            NativeValue::Float(f) => match *ty {
                #[allow(clippy::cast_possible_truncation)]
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                _ if is_text(ty) => f.to_string().to_sql(ty, out),
                _ => Err(mismatch("float", ty)),
            },
            NativeValue::Text(s) => match *ty {
                Type::JSON | Type::JSONB => serde_json::from_str::<JsonValue>(s)?.to_sql(ty, out),
                _ if <&str as ToSql>::accepts(ty) => s.as_str().to_sql(ty, out),
                _ => Err(mismatch("text", ty)),
            },
            NativeValue::Bool(b) => b.to_sql(ty, out),
            NativeValue::Timestamp(dt) => match *ty {
                Type::TIMESTAMPTZ => dt.and_utc().to_sql(ty, out),
                Type::DATE => dt.date().to_sql(ty, out),
                _ if is_text(ty) => dt.format("%F %T%.f").to_string().to_sql(ty, out),
                _ => dt.to_sql(ty, out),
            },
            NativeValue::Json(jval) => match *ty {
                _ if is_text(ty) => jval.to_string().to_sql(ty, out),
                _ => jval.to_sql(ty, out),
            },
            NativeValue::Blob(bytes) => bytes.as_slice().to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Type checks happen per value in `to_sql`.
        true
    }

    to_sql_checked!();
}

/// Borrow native values as the parameter slice tokio-postgres expects.
#[must_use]
pub fn as_refs(params: &[NativeValue]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(value: &NativeValue, ty: &Type) -> SqlResult {
        let mut out = bytes::BytesMut::new();
        value.to_sql(ty, &mut out)
    }

    #[test]
    fn text_binds_only_to_text_like_types() {
        let value = NativeValue::Text("42".into());
        assert!(matches!(bind(&value, &Type::TEXT), Ok(IsNull::No)));
        assert!(matches!(bind(&value, &Type::VARCHAR), Ok(IsNull::No)));
        let err = bind(&value, &Type::INT4).err().expect("binding text to int4 should fail");
        assert!(err.to_string().contains("cannot bind text value"));
    }

    #[test]
    fn text_into_json_must_parse() {
        assert!(bind(&NativeValue::Text(r#"{"a": 1}"#.into()), &Type::JSONB).is_ok());
        assert!(bind(&NativeValue::Text("not json".into()), &Type::JSONB).is_err());
    }

    #[test]
    fn integers_adapt_to_the_column_width() {
        assert!(bind(&NativeValue::Int(7), &Type::INT2).is_ok());
        assert!(bind(&NativeValue::Int(i64::from(i16::MAX) + 1), &Type::INT2).is_err());
        assert!(matches!(bind(&NativeValue::DbNull, &Type::INT8), Ok(IsNull::Yes)));
    }
}
