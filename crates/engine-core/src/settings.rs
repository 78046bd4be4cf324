//! Run parameters handed to the engine by the command line.

use model::{table::TableRef, watermark::Watermark};
use std::time::Duration;

pub const DEFAULT_FETCH_SIZE: usize = 10_000;
/// Largest batch the command line accepts.
pub const MAX_FETCH_SIZE: usize = 1_000_000;
pub const DEFAULT_MAX_RETRIES: u32 = 10_000;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// Source table, optionally schema qualified.
    pub source_table: String,
    pub landing_table: TableRef,
    /// Date-bearing ordering column; without it every attempt is a full scan.
    pub where_condition_column: Option<String>,
    pub start_condition: Option<Watermark>,
    pub end_condition: Option<Watermark>,
    pub fetch_size: usize,
    /// Field schema document in the bucket.
    pub schema_file_path: Option<String>,
}

impl ExtractSettings {
    pub fn new(source_table: impl Into<String>, landing_table: TableRef) -> Self {
        Self {
            source_table: source_table.into(),
            landing_table,
            where_condition_column: None,
            start_condition: None,
            end_condition: None,
            fetch_size: DEFAULT_FETCH_SIZE,
            schema_file_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FinalizeSettings {
    pub final_table: TableRef,
    pub sql_file_path: String,
}
