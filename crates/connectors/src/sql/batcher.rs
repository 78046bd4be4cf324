use crate::{
    error::ExtractError,
    source::{BatchHandler, ExtractSummary},
};
use model::records::{batch::Batch, row::TextRow};
use std::sync::Arc;
use tracing::debug;

/// Upper bound on rows reserved up front; larger batches grow on demand.
const PREALLOC_ROWS: usize = 4_096;

/// Groups cursor rows into fixed-size batches and hands each one to the
/// handler as soon as it is full.
pub(crate) struct Batcher<'h> {
    handler: &'h mut dyn BatchHandler,
    fetch_size: usize,
    columns: Arc<[String]>,
    pending: Vec<TextRow>,
    summary: ExtractSummary,
}

impl<'h> Batcher<'h> {
    pub fn new(handler: &'h mut dyn BatchHandler, fetch_size: usize, columns: Vec<String>) -> Self {
        Self {
            handler,
            fetch_size,
            columns: Arc::from(columns),
            pending: Vec::with_capacity(fetch_size.min(PREALLOC_ROWS)),
            summary: ExtractSummary::default(),
        }
    }

    pub async fn push(&mut self, row: TextRow) -> Result<(), ExtractError> {
        self.pending.push(row);
        if self.pending.len() >= self.fetch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Flushes the final partial batch and returns the totals.
    pub async fn finish(mut self) -> Result<ExtractSummary, ExtractError> {
        self.flush().await?;
        Ok(self.summary)
    }

    async fn flush(&mut self) -> Result<(), ExtractError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let rows = std::mem::replace(
            &mut self.pending,
            Vec::with_capacity(self.fetch_size.min(PREALLOC_ROWS)),
        );
        let seq = self.summary.batches + 1;
        let count = rows.len();
        debug!(batch = seq, rows = count, "Fetched batch");

        let batch = Batch::new(seq, Arc::clone(&self.columns), rows);
        self.handler
            .handle(batch)
            .await
            .map_err(|source| ExtractError::Handler { batch: seq, source })?;

        self.summary.batches = seq;
        self.summary.rows += count;
        Ok(())
    }
}
