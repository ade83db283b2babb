use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// Column names shared by every row of one result set, with a name → index lookup.
#[derive(Debug, Default)]
pub struct RowNames {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl RowNames {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        // First occurrence wins for duplicate column names.
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { names, index }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn position(&self, column_name: &str) -> Option<usize> {
        self.index.get(column_name).copied()
    }
}

/// A fixed-arity row of portable values, in `description` order.
#[derive(Debug, Clone)]
pub struct Row {
    column_names: Arc<RowNames>,
    values: Vec<RowValues>,
}

impl Row {
    #[must_use]
    pub fn new(column_names: Arc<RowNames>, values: Vec<RowValues>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.column_names.names()
    }

    /// Get a value by column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.column_names
            .position(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        self.values
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.column_names() == other.column_names()
    }
}

impl std::ops::Index<usize> for Row {
    type Output = RowValues;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_uses_first_duplicate() {
        let names = Arc::new(RowNames::new(vec!["id".into(), "name".into(), "id".into()]));
        let row = Row::new(
            names,
            vec![RowValues::Int(1), RowValues::Null, RowValues::Int(2)],
        );
        assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
        assert_eq!(row.get("name"), Some(&RowValues::Null));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_by_index(2), Some(&RowValues::Int(2)));
        assert_eq!(row.len(), 3);
    }
}
