use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use model::core::value::Value;
use mysql_async::{Column, Row, Value as MySqlValue};

/// Character set id MySQL reports for binary columns.
const BINARY_CHARSET: u16 = 63;

pub(crate) fn decode_row(row: &Row) -> Vec<Value> {
    let columns = row.columns_ref();
    (0..row.len())
        .map(|idx| match row.as_ref(idx) {
            Some(value) => decode_value(value, &columns[idx]),
            None => Value::Null,
        })
        .collect()
}

fn decode_value(value: &MySqlValue, column: &Column) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(bytes) if column.character_set() == BINARY_CHARSET => {
            Value::Bytes(bytes.clone())
        }
        MySqlValue::Bytes(bytes) => match String::from_utf8(bytes.clone()) {
            Ok(text) => Value::String(text),
            Err(err) => Value::Bytes(err.into_bytes()),
        },
        MySqlValue::Int(v) => Value::Int(*v),
        MySqlValue::UInt(v) => Value::Uint(*v),
        MySqlValue::Float(v) => Value::Float32(*v),
        MySqlValue::Double(v) => Value::Float(*v),
        MySqlValue::Date(y, m, d, hh, mm, ss, us) => decode_date(*y, *m, *d, *hh, *mm, *ss, *us),
        MySqlValue::Time(neg, days, hh, mm, ss, us) => {
            let hours = *days * 24 + *hh as u32;
            let sign = if *neg { "-" } else { "" };
            Value::String(format!("{sign}{hours:02}:{mm:02}:{ss:02}.{us:06}"))
        }
    }
}

fn decode_date(y: u16, m: u8, d: u8, hh: u8, mm: u8, ss: u8, us: u32) -> Value {
    let Some(date) = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32) else {
        // Zero dates such as 0000-00-00 have no calendar equivalent.
        return Value::String(format!("{y:04}-{m:02}-{d:02} {hh:02}:{mm:02}:{ss:02}"));
    };
    if hh == 0 && mm == 0 && ss == 0 && us == 0 {
        return Value::Date(date);
    }
    match NaiveTime::from_hms_micro_opt(hh as u32, mm as u32, ss as u32, us) {
        Some(time) => Value::TimestampNaive(NaiveDateTime::new(date, time)),
        None => Value::Date(date),
    }
}
