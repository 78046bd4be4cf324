use crate::records::row::TextRow;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// A bounded slice of the extraction cursor, paired with the column names of
/// the result descriptor that produced it.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based position of this batch within one extraction attempt.
    pub seq: usize,
    pub columns: Arc<[String]>,
    pub rows: Vec<TextRow>,
}

impl Batch {
    pub fn new(seq: usize, columns: Arc<[String]>, rows: Vec<TextRow>) -> Self {
        Batch { seq, columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows as JSON objects keyed by column name, all values as strings.
    /// Used when no field schema is available for the destination.
    pub fn to_untyped_json(&self) -> Vec<Map<String, JsonValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.values.iter())
                    .map(|(col, val)| {
                        let json = match val {
                            Some(text) => JsonValue::String(text.clone()),
                            None => JsonValue::Null,
                        };
                        (col.clone(), json)
                    })
                    .collect()
            })
            .collect()
    }
}
