//! Typed decoding of Postgres cells into [`Value`]s.
//!
//! Types without a native decoder here (intervals, network addresses, enums,
//! arrays, money, ...) are never fetched in binary form: [`text_cast_query`]
//! wraps the extraction query so the server renders them as text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use model::core::value::Value;
use planner::query::dialect::{Dialect, Postgres};
use std::error::Error;
use tokio_postgres::{
    Row,
    types::{FromSql, Type},
};
use tracing::warn;
use uuid::Uuid;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Alias of the derived table in [`text_cast_query`].
const SOURCE_ALIAS: &str = "tidewater_src";

pub(crate) fn decode_row(row: &Row) -> Vec<Value> {
    (0..row.len()).map(|idx| decode_cell(row, idx)).collect()
}

/// True when [`decode_row`] reads `ty` from its binary form.
pub(crate) fn decodes_natively(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::CHAR
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::OID
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::NUMERIC
            | Type::JSON
            | Type::JSONB
            | Type::UUID
            | Type::BYTEA
            | Type::DATE
            | Type::TIME
            | Type::TIMESTAMP
            | Type::TIMESTAMPTZ
    ) || <String as FromSql>::accepts(ty)
}

/// Rewrites `query` so every column of a type without a native decoder is
/// cast to `text`, keeping names and order. `None` when no cast is needed.
pub(crate) fn text_cast_query(query: &str, columns: &[(&str, &Type)]) -> Option<String> {
    if columns.iter().all(|(_, ty)| decodes_natively(ty)) {
        return None;
    }

    let projection = columns
        .iter()
        .map(|(name, ty)| {
            let quoted = Postgres.quote_identifier(name);
            if decodes_natively(ty) {
                format!("{SOURCE_ALIAS}.{quoted}")
            } else {
                format!("{SOURCE_ALIAS}.{quoted}::text AS {quoted}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!(
        "SELECT {projection} FROM ({}) AS {SOURCE_ALIAS}",
        query.trim().trim_end_matches(';')
    ))
}

fn decode_cell(row: &Row, idx: usize) -> Value {
    let ty = row.columns()[idx].type_().clone();
    match try_decode(row, idx, &ty) {
        Some(value) => value,
        None => {
            warn!(
                column = row.columns()[idx].name(),
                pg_type = %ty,
                "Unable to decode column value, sending NULL"
            );
            Value::Null
        }
    }
}

fn try_decode(row: &Row, idx: usize, ty: &Type) -> Option<Value> {
    macro_rules! get {
        ($t:ty) => {
            row.try_get::<_, Option<$t>>(idx).ok()
        };
    }

    let value = match *ty {
        Type::BOOL => get!(bool)?.map(Value::Boolean),
        Type::CHAR => get!(i8)?.map(|v| Value::Int(v as i64)),
        Type::INT2 => get!(i16)?.map(|v| Value::Int(v as i64)),
        Type::INT4 => get!(i32)?.map(|v| Value::Int(v as i64)),
        Type::INT8 => get!(i64)?.map(Value::Int),
        Type::OID => get!(u32)?.map(|v| Value::Uint(v as u64)),
        Type::FLOAT4 => get!(f32)?.map(Value::Float32),
        Type::FLOAT8 => get!(f64)?.map(Value::Float),
        Type::NUMERIC => get!(NumericText)?.map(|v| Value::Decimal(v.0)),
        Type::JSON | Type::JSONB => get!(serde_json::Value)?.map(Value::Json),
        Type::UUID => get!(Uuid)?.map(Value::Uuid),
        Type::BYTEA => get!(Vec<u8>)?.map(Value::Bytes),
        Type::DATE => get!(NaiveDate)?.map(Value::Date),
        Type::TIME => get!(NaiveTime)?.map(Value::Time),
        Type::TIMESTAMP => get!(NaiveDateTime)?.map(Value::TimestampNaive),
        Type::TIMESTAMPTZ => get!(DateTime<Utc>)?.map(Value::Timestamp),
        _ => get!(String)?.map(Value::String),
    };

    Some(value.unwrap_or(Value::Null))
}

/// A `numeric` rendered to its exact decimal text, with no precision limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NumericText(pub String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let mut words = raw
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        let mut next = || words.next().ok_or("truncated numeric value");

        let ndigits = next()? as usize;
        let weight = next()? as i16 as i32;
        let sign = next()?;
        let dscale = next()? as usize;
        let digits = (0..ndigits)
            .map(|_| next())
            .collect::<Result<Vec<_>, _>>()?;
        if digits.iter().any(|d| *d > 9999) {
            return Err("numeric digit out of range".into());
        }

        let negative = match sign {
            NUMERIC_POS => false,
            NUMERIC_NEG => true,
            NUMERIC_NAN => return Ok(NumericText("NaN".into())),
            NUMERIC_PINF => return Ok(NumericText("Infinity".into())),
            NUMERIC_NINF => return Ok(NumericText("-Infinity".into())),
            other => return Err(format!("invalid numeric sign {other:#06x}").into()),
        };

        // Digit `i` holds base-10000 position `weight - i`.
        let digit_at = |position: i32| -> u16 {
            let idx = weight - position;
            if idx >= 0 && (idx as usize) < digits.len() {
                digits[idx as usize]
            } else {
                0
            }
        };

        let mut text = String::new();
        if negative && !digits.is_empty() {
            text.push('-');
        }

        if weight < 0 || digits.is_empty() {
            text.push('0');
        } else {
            text.push_str(&digit_at(weight).to_string());
            for position in (0..weight).rev() {
                text.push_str(&format!("{:04}", digit_at(position)));
            }
        }

        if dscale > 0 {
            let groups = dscale.div_ceil(4) as i32;
            let fraction = (1..=groups)
                .map(|k| format!("{:04}", digit_at(-k)))
                .collect::<String>();
            text.push('.');
            text.push_str(&fraction[..dscale]);
        }

        Ok(NumericText(text))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_postgres::types::Kind;

    fn numeric(words: &[u16]) -> String {
        let raw: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        NumericText::from_sql(&Type::NUMERIC, &raw).unwrap().0
    }

    #[test]
    fn numeric_beyond_96_bits_is_exact() {
        // 10^32: one digit group of 1 at weight 8.
        assert_eq!(numeric(&[1, 8, NUMERIC_POS, 0, 1]), format!("1{}", "0".repeat(32)));
        // 38 nines, NUMERIC(38,0).
        let mut words = vec![10, 9, NUMERIC_POS, 0, 99];
        words.extend([9999; 9]);
        assert_eq!(numeric(&words), "9".repeat(38));
    }

    #[test]
    fn numeric_keeps_declared_scale() {
        assert_eq!(numeric(&[2, 0, NUMERIC_POS, 2, 12, 5000]), "12.50");
        assert_eq!(numeric(&[1, -1i16 as u16, NUMERIC_POS, 3, 10]), "0.001");
        assert_eq!(numeric(&[2, 1, NUMERIC_NEG, 0, 1, 2345]), "-12345");
        assert_eq!(numeric(&[0, 0, NUMERIC_POS, 2]), "0.00");
        assert_eq!(numeric(&[0, 0, NUMERIC_NAN, 0]), "NaN");
    }

    #[test]
    fn truncated_numeric_is_an_error() {
        assert!(NumericText::from_sql(&Type::NUMERIC, &[0, 2, 0, 0, 0, 0, 0, 0, 0, 1]).is_err());
    }

    #[test]
    fn known_types_are_not_cast() {
        let columns = [("ORDER_ID", &Type::INT8), ("NOTE", &Type::VARCHAR), ("AMOUNT", &Type::NUMERIC)];
        assert_eq!(text_cast_query("SELECT * FROM ORDERS", &columns), None);
    }

    #[test]
    fn unlisted_types_are_fetched_as_text() {
        let mood = Type::new(
            "mood".into(),
            90_001,
            Kind::Enum(vec!["happy".into(), "sad".into()]),
            "public".into(),
        );
        let columns = [
            ("ID", &Type::INT4),
            ("WAIT", &Type::INTERVAL),
            ("HOST", &Type::INET),
            ("TAGS", &Type::TEXT_ARRAY),
            ("FEE", &Type::MONEY),
            ("MOOD", &mood),
        ];

        let query = text_cast_query("SELECT * FROM ORDERS;", &columns).unwrap();
        assert_eq!(
            query,
            "SELECT tidewater_src.\"ID\", \
             tidewater_src.\"WAIT\"::text AS \"WAIT\", \
             tidewater_src.\"HOST\"::text AS \"HOST\", \
             tidewater_src.\"TAGS\"::text AS \"TAGS\", \
             tidewater_src.\"FEE\"::text AS \"FEE\", \
             tidewater_src.\"MOOD\"::text AS \"MOOD\" \
             FROM (SELECT * FROM ORDERS) AS tidewater_src"
        );
        assert!(!decodes_natively(&Type::INTERVAL));
        assert!(decodes_natively(&Type::TEXT));
    }
}
