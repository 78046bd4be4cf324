use crate::{
    error::AttemptError,
    settings::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INTERVAL},
};
use connectors::error::{ExtractError, SourceError};
use std::time::Duration;

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Whole-extract restarts: a fixed pause, then a fresh attempt from a
/// recomputed checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Restarts allowed after the first attempt.
    pub max_restarts: u32,
    pub interval: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: DEFAULT_MAX_RETRIES,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl RestartPolicy {
    pub fn new(max_restarts: u32, interval: Duration) -> Self {
        Self {
            max_restarts,
            interval,
        }
    }
}

pub fn classify_attempt_error(err: &AttemptError) -> RetryDisposition {
    match err {
        AttemptError::Checkpoint(_) => RetryDisposition::Stop,
        AttemptError::Query(_) => RetryDisposition::Stop,
        AttemptError::Schema(_) => RetryDisposition::Retry,
        AttemptError::Extract(extract) => classify_extract_error(extract),
    }
}

fn classify_extract_error(err: &ExtractError) -> RetryDisposition {
    match err {
        ExtractError::Handler { .. } => RetryDisposition::Retry,
        ExtractError::Source(source) => match source {
            SourceError::Config(_) | SourceError::ZeroFetchSize => RetryDisposition::Stop,
            SourceError::Postgres(_)
            | SourceError::MySql(_)
            | SourceError::Io(_)
            | SourceError::Tls(_) => RetryDisposition::Retry,
        },
    }
}
