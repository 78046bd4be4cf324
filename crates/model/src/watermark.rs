//! Date bounds used to resume an incremental extract.

use crate::error::ModelError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Textual pattern of a watermark, e.g. `15-Mar-2024`.
pub const WATERMARK_FORMAT: &str = "%d-%b-%Y";

const ISO_FORMAT: &str = "%Y-%m-%d";

/// The latest ordering-column date already present in the staging table.
///
/// The same type carries user-supplied start and end bounds, since they share
/// the textual format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Watermark(NaiveDate);

impl Watermark {
    /// `01-Jan-0001`: nothing has been loaded yet.
    pub const EPOCH: Watermark = match NaiveDate::from_ymd_opt(1, 1, 1) {
        Some(date) => Watermark(date),
        None => panic!("0001-01-01 is a valid date"),
    };

    pub fn new(date: NaiveDate) -> Self {
        Watermark(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn is_epoch(&self) -> bool {
        *self == Self::EPOCH
    }

    /// Accepts `DD-Mon-YYYY` (month name in any case) and ISO `YYYY-MM-DD`.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let trimmed = text.trim();
        NaiveDate::parse_from_str(trimmed, WATERMARK_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_FORMAT))
            .map(Watermark)
            .map_err(|_| ModelError::InvalidDate(text.to_string()))
    }

    /// The later of two optional bounds, ignoring the epoch sentinel.
    pub fn latest(a: Option<Watermark>, b: Option<Watermark>) -> Option<Watermark> {
        let a = a.filter(|w| !w.is_epoch());
        let b = b.filter(|w| !w.is_epoch());
        match (a, b) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WATERMARK_FORMAT))
    }
}

impl FromStr for Watermark {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Watermark::parse(s)
    }
}

impl Serialize for Watermark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Watermark {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Watermark::parse(&text).map_err(serde::de::Error::custom)
    }
}
