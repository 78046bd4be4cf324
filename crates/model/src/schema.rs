//! Field definitions describing the destination table.
//!
//! The document format is a JSON array of `{"name", "type", "mode"}` objects,
//! the same shape the warehouse uses for table schemas.

use crate::{core::utils::normalize_bool, error::ModelError, records::batch::Batch};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Bytes,
    Integer,
    Float,
    Numeric,
    BigNumeric,
    Boolean,
    Timestamp,
    Date,
    Time,
    DateTime,
    Geography,
    Json,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Bytes => "BYTES",
            FieldType::Integer => "INT64",
            FieldType::Float => "FLOAT64",
            FieldType::Numeric => "NUMERIC",
            FieldType::BigNumeric => "BIGNUMERIC",
            FieldType::Boolean => "BOOL",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::DateTime => "DATETIME",
            FieldType::Geography => "GEOGRAPHY",
            FieldType::Json => "JSON",
        }
    }
}

impl FromStr for FieldType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STRING" => Ok(FieldType::String),
            "BYTES" => Ok(FieldType::Bytes),
            "INTEGER" | "INT64" => Ok(FieldType::Integer),
            "FLOAT" | "FLOAT64" => Ok(FieldType::Float),
            "NUMERIC" | "DECIMAL" => Ok(FieldType::Numeric),
            "BIGNUMERIC" | "BIGDECIMAL" => Ok(FieldType::BigNumeric),
            "BOOLEAN" | "BOOL" => Ok(FieldType::Boolean),
            "TIMESTAMP" => Ok(FieldType::Timestamp),
            "DATE" => Ok(FieldType::Date),
            "TIME" => Ok(FieldType::Time),
            "DATETIME" => Ok(FieldType::DateTime),
            "GEOGRAPHY" => Ok(FieldType::Geography),
            "JSON" => Ok(FieldType::Json),
            other => Err(ModelError::UnknownFieldType(other.to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

impl FromStr for FieldMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NULLABLE" => Ok(FieldMode::Nullable),
            "REQUIRED" => Ok(FieldMode::Required),
            "REPEATED" => Ok(FieldMode::Repeated),
            other => Err(ModelError::UnknownFieldMode(other.to_string())),
        }
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Required => "REQUIRED",
            FieldMode::Repeated => "REPEATED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub mode: FieldMode,
}

#[derive(Serialize, Deserialize)]
struct RawFieldDef {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    mode: Option<String>,
}

impl TryFrom<RawFieldDef> for FieldDef {
    type Error = ModelError;

    fn try_from(raw: RawFieldDef) -> Result<Self, Self::Error> {
        Ok(FieldDef {
            name: raw.name,
            field_type: raw.field_type.parse()?,
            mode: raw.mode.as_deref().unwrap_or_default().parse()?,
        })
    }
}

/// Reasons a batch cannot be written under a schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConformError {
    #[error("Column '{0}' is not declared in the field schema")]
    UnknownColumn(String),

    #[error("Column '{column}' is REQUIRED but row {row} holds NULL")]
    NullInRequired { column: String, row: usize },

    #[error("Column '{column}' expects BOOL but row {row} holds '{value}'")]
    InvalidBoolean {
        column: String,
        row: usize,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSchema {
    pub fields: Vec<FieldDef>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        FieldSchema { fields }
    }

    /// Every column as a NULLABLE STRING, the shape untyped rows append into.
    pub fn untyped(columns: &[String]) -> Self {
        let fields = columns
            .iter()
            .map(|name| FieldDef {
                name: name.clone(),
                field_type: FieldType::String,
                mode: FieldMode::Nullable,
            })
            .collect();
        FieldSchema { fields }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let raw: Vec<RawFieldDef> = serde_json::from_slice(bytes)?;
        let fields = raw
            .into_iter()
            .map(FieldDef::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldSchema { fields })
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shapes a batch into warehouse rows typed by this schema. Row order and
    /// column set are preserved; keys take the schema's spelling.
    pub fn conform(&self, batch: &Batch) -> Result<Vec<Map<String, JsonValue>>, ConformError> {
        let fields = batch
            .columns
            .iter()
            .map(|col| {
                self.field(col)
                    .ok_or_else(|| ConformError::UnknownColumn(col.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        batch
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                fields
                    .iter()
                    .zip(row.values.iter())
                    .map(|(field, value)| {
                        let json = conform_value(field, value.as_deref(), row_idx)?;
                        Ok((field.name.clone(), json))
                    })
                    .collect::<Result<Map<_, _>, ConformError>>()
            })
            .collect()
    }
}

fn conform_value(
    field: &FieldDef,
    value: Option<&str>,
    row: usize,
) -> Result<JsonValue, ConformError> {
    let Some(text) = value else {
        return match field.mode {
            FieldMode::Required => Err(ConformError::NullInRequired {
                column: field.name.clone(),
                row,
            }),
            FieldMode::Repeated => Ok(JsonValue::Array(Vec::new())),
            FieldMode::Nullable => Ok(JsonValue::Null),
        };
    };

    if field.mode == FieldMode::Repeated {
        return Ok(match serde_json::from_str::<JsonValue>(text) {
            Ok(JsonValue::Array(items)) => JsonValue::Array(items),
            _ => JsonValue::Array(vec![JsonValue::String(text.to_string())]),
        });
    }

    match field.field_type {
        FieldType::Boolean => normalize_bool(text)
            .map(|b| JsonValue::String(b.to_string()))
            .ok_or_else(|| ConformError::InvalidBoolean {
                column: field.name.clone(),
                row,
                value: text.to_string(),
            }),
        _ => Ok(JsonValue::String(text.to_string())),
    }
}

impl Serialize for FieldDef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawFieldDef {
            name: self.name.clone(),
            field_type: self.field_type.to_string(),
            mode: Some(self.mode.to_string()),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::row::TextRow;
    use std::sync::Arc;

    const DOC: &str = r#"[
        {"name": "ORDER_ID", "type": "INTEGER", "mode": "REQUIRED"},
        {"name": "ORDER_DATE", "type": "STRING", "mode": "NULLABLE"},
        {"name": "PAID", "type": "BOOLEAN"},
        {"name": "TAGS", "type": "STRING", "mode": "REPEATED"}
    ]"#;

    fn batch(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> Batch {
        Batch::new(
            1,
            Arc::from(columns.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
            rows.into_iter()
                .map(|r| TextRow::new(r.into_iter().map(|v| v.map(str::to_string)).collect()))
                .collect(),
        )
    }

    #[test]
    fn parses_document_with_default_mode() {
        let schema = FieldSchema::from_json(DOC.as_bytes()).unwrap();
        assert_eq!(schema.fields.len(), 4);
        assert_eq!(schema.fields[0].field_type, FieldType::Integer);
        assert_eq!(schema.fields[0].mode, FieldMode::Required);
        assert_eq!(schema.fields[2].mode, FieldMode::Nullable);
    }

    #[test]
    fn untyped_schema_is_nullable_strings() {
        let schema = FieldSchema::untyped(&["ORDER_ID".into(), "NOTE".into()]);
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.fields.iter().all(|f| f.field_type == FieldType::String
            && f.mode == FieldMode::Nullable));
        assert_eq!(schema.fields[1].name, "NOTE");
    }

    #[test]
    fn rejects_unknown_type() {
        let doc = r#"[{"name": "X", "type": "BLOBBY"}]"#;
        assert!(matches!(
            FieldSchema::from_json(doc.as_bytes()),
            Err(ModelError::UnknownFieldType(_))
        ));
    }

    #[test]
    fn conform_preserves_order_and_uses_schema_names() {
        let schema = FieldSchema::from_json(DOC.as_bytes()).unwrap();
        let b = batch(
            &["order_id", "order_date", "paid"],
            vec![
                vec![Some("1"), Some("15-Mar-2024"), Some("t")],
                vec![Some("2"), None, Some("0")],
            ],
        );

        let rows = schema.conform(&b).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ORDER_ID"], "1");
        assert_eq!(rows[0]["PAID"], "true");
        assert_eq!(rows[1]["ORDER_ID"], "2");
        assert!(rows[1]["ORDER_DATE"].is_null());
        assert_eq!(rows[1]["PAID"], "false");
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn conform_rejects_null_in_required() {
        let schema = FieldSchema::from_json(DOC.as_bytes()).unwrap();
        let b = batch(&["ORDER_ID"], vec![vec![Some("1")], vec![None]]);
        assert_eq!(
            schema.conform(&b),
            Err(ConformError::NullInRequired {
                column: "ORDER_ID".into(),
                row: 1
            })
        );
    }

    #[test]
    fn conform_rejects_undeclared_column() {
        let schema = FieldSchema::from_json(DOC.as_bytes()).unwrap();
        let b = batch(&["ORDER_ID", "EXTRA"], vec![vec![Some("1"), Some("x")]]);
        assert_eq!(
            schema.conform(&b),
            Err(ConformError::UnknownColumn("EXTRA".into()))
        );
    }

    #[test]
    fn repeated_values_become_arrays() {
        let schema = FieldSchema::from_json(DOC.as_bytes()).unwrap();
        let b = batch(
            &["TAGS"],
            vec![vec![Some(r#"["a","b"]"#)], vec![Some("solo")], vec![None]],
        );
        let rows = schema.conform(&b).unwrap();
        assert_eq!(rows[0]["TAGS"], serde_json::json!(["a", "b"]));
        assert_eq!(rows[1]["TAGS"], serde_json::json!(["solo"]));
        assert_eq!(rows[2]["TAGS"], serde_json::json!([]));
    }
}
