use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    attempts: AtomicU64,
    restarts: AtomicU64,
    batches_appended: AtomicU64,
    rows_appended: AtomicU64,
}

/// Run-wide counters shared by the supervisor and the append sink.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub attempts: u64,
    pub restarts: u64,
    pub batches_appended: u64,
    pub rows_appended: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_attempts(&self) {
        self.inner.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_restarts(&self) {
        self.inner.restarts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self, rows: u64) {
        self.inner.batches_appended.fetch_add(1, Ordering::Relaxed);
        self.inner.rows_appended.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts: self.inner.attempts.load(Ordering::Relaxed),
            restarts: self.inner.restarts.load(Ordering::Relaxed),
            batches_appended: self.inner.batches_appended.load(Ordering::Relaxed),
            rows_appended: self.inner.rows_appended.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
