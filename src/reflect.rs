//! Column descriptors for the `description` of a cursor.

use crate::backend::ResultStream;

/// One entry of a cursor's `description`.
///
/// Mirrors the seven-field `(name, type, display_size, internal_size, precision, scale,
/// null_ok)` shape; only `name` and `type_code` are filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_code: String,
    pub display_size: Option<i64>,
    pub internal_size: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub null_ok: Option<bool>,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, type_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_code: type_code.into(),
            display_size: None,
            internal_size: None,
            precision: None,
            scale: None,
            null_ok: None,
        }
    }

    #[allow(clippy::type_complexity)]
    #[must_use]
    pub fn as_tuple(
        &self,
    ) -> (
        &str,
        &str,
        Option<i64>,
        Option<i64>,
        Option<i64>,
        Option<i64>,
        Option<bool>,
    ) {
        (
            &self.name,
            &self.type_code,
            self.display_size,
            self.internal_size,
            self.precision,
            self.scale,
            self.null_ok,
        )
    }
}

/// Describe the columns of an open result stream, in result order.
#[must_use]
pub fn reflect_columns(stream: &dyn ResultStream) -> Vec<ColumnDescriptor> {
    stream
        .columns()
        .iter()
        .map(|col| ColumnDescriptor::new(col.name.clone(), col.type_name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BufferedStream, NativeColumn};

    #[test]
    fn reflects_name_and_type_only() {
        let stream = BufferedStream::new(
            vec![
                NativeColumn::new("id", "int4"),
                NativeColumn::new("name", "text"),
            ],
            Vec::new(),
        );
        let description = reflect_columns(&stream);
        assert_eq!(description.len(), 2);
        assert_eq!(
            description[1].as_tuple(),
            ("name", "text", None, None, None, None, None)
        );
    }
}
