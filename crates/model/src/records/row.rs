use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// One source row after text coercion, in result-descriptor column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRow {
    pub values: Vec<Option<String>>,
}

impl TextRow {
    pub fn new(values: Vec<Option<String>>) -> Self {
        TextRow { values }
    }

    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        TextRow {
            values: values.into_iter().map(|v| v.to_text()).collect(),
        }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_every_value_to_text() {
        let row = TextRow::from_values(vec![
            Value::Int(1),
            Value::Null,
            Value::String("abc".into()),
        ]);
        assert_eq!(row.len(), 3);
        assert_eq!(row.get(0), Some("1"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), Some("abc"));
    }
}
