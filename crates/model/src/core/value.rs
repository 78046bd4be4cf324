use crate::core::utils::encode_hex;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A typed cell as decoded by a source driver, before it is coerced to text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    /// Single precision, rendered without widening.
    Float32(f32),
    Float(f64),
    /// Exact numerics are kept in the driver's canonical decimal text.
    Decimal(String),
    String(String),
    Boolean(bool),
    Json(serde_json::Value),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
    TimestampNaive(NaiveDateTime),
    Null,
}

impl Value {
    /// Textual form written to the warehouse. SQL NULL stays `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Int(v) => Some(v.to_string()),
            Value::Uint(v) => Some(v.to_string()),
            Value::Float32(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Decimal(v) => Some(v.clone()),
            Value::String(v) => Some(v.clone()),
            Value::Boolean(v) => Some(v.to_string()),
            Value::Json(v) => Some(v.to_string()),
            Value::Uuid(v) => Some(v.to_string()),
            Value::Bytes(v) => Some(encode_hex(v)),
            Value::Date(v) => Some(v.format("%Y-%m-%d").to_string()),
            Value::Time(v) => Some(v.format("%H:%M:%S%.f").to_string()),
            Value::Timestamp(v) => Some(v.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string()),
            Value::TimestampNaive(v) => Some(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Value::Null => None,
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn null_has_no_text() {
        assert_eq!(Value::Null.to_text(), None);
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn temporal_values_render_warehouse_friendly() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(Value::Date(date).to_text().unwrap(), "2024-03-15");

        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap();
        assert_eq!(
            Value::Timestamp(ts).to_text().unwrap(),
            "2024-03-15 10:30:00+00:00"
        );
    }

    #[test]
    fn scalars_and_bytes() {
        assert_eq!(Value::Int(-7).to_text().unwrap(), "-7");
        assert_eq!(Value::Float32(0.1).to_text().unwrap(), "0.1");
        assert_eq!(Value::Boolean(true).to_text().unwrap(), "true");
        assert_eq!(Value::Decimal("12.50".into()).to_text().unwrap(), "12.50");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_text().unwrap(), "dead");
        assert_eq!(
            Value::Json(serde_json::json!({"a": 1})).to_text().unwrap(),
            r#"{"a":1}"#
        );
    }
}
