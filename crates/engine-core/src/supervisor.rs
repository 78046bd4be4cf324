//! Runs the extraction loop and restarts it from a fresh checkpoint when an
//! attempt fails.

use crate::{
    checkpoint::CheckpointResolver,
    error::{AttemptError, SupervisorError},
    metrics::Metrics,
    retry::{RestartPolicy, RetryDisposition, classify_attempt_error},
    schema::SchemaLoader,
    settings::ExtractSettings,
    sink::AppendSink,
};
use connectors::{
    blob::BlobStore,
    source::{ExtractSummary, SourceConnector},
    warehouse::Warehouse,
};
use model::{schema::FieldSchema, watermark::Watermark};
use planner::query::extract::ExtractQuery;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// The query an attempt will run, and the bounds it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractPlan {
    /// `None` when no ordering column is configured.
    pub checkpoint: Option<Watermark>,
    pub lower_bound: Option<Watermark>,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractReport {
    pub attempts: u32,
    /// Batches and rows of the attempt that reached the end of the cursor.
    pub batches: usize,
    pub rows: usize,
    /// Rows appended across every attempt, failed ones included.
    pub rows_appended_total: u64,
    pub lower_bound: Option<Watermark>,
}

enum State {
    Extracting { attempt: u32, remaining: u32 },
    FailedExhausted { attempts: u32, last: AttemptError },
    Completed { attempts: u32, plan: ExtractPlan, summary: ExtractSummary },
}

pub struct Supervisor {
    source: Arc<dyn SourceConnector>,
    warehouse: Arc<dyn Warehouse>,
    checkpoints: CheckpointResolver,
    schemas: Option<SchemaLoader>,
    settings: ExtractSettings,
    policy: RestartPolicy,
    metrics: Metrics,
}

impl Supervisor {
    pub fn new(
        source: Arc<dyn SourceConnector>,
        warehouse: Arc<dyn Warehouse>,
        blobs: Option<Arc<dyn BlobStore>>,
        settings: ExtractSettings,
        policy: RestartPolicy,
    ) -> Self {
        Self {
            source,
            checkpoints: CheckpointResolver::new(Arc::clone(&warehouse)),
            warehouse,
            schemas: blobs.map(SchemaLoader::new),
            settings,
            policy,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Resolves the checkpoint and builds the extraction query.
    pub async fn plan(&self) -> Result<ExtractPlan, AttemptError> {
        let column = self.settings.where_condition_column.as_deref();

        let checkpoint = match column {
            Some(column) => Some(
                self.checkpoints
                    .resolve(&self.settings.landing_table, column)
                    .await?,
            ),
            None => None,
        };
        let lower_bound = Watermark::latest(checkpoint, self.settings.start_condition);

        let dialect = self.source.dialect();
        let query = ExtractQuery::new(self.settings.source_table.as_str())
            .ordered_by(column)
            .lower(lower_bound)
            .upper(self.settings.end_condition)
            .build(dialect.as_ref())?;

        Ok(ExtractPlan {
            checkpoint,
            lower_bound,
            query,
        })
    }

    async fn load_schema(&self) -> Result<Option<Arc<FieldSchema>>, AttemptError> {
        let (Some(loader), Some(path)) = (&self.schemas, &self.settings.schema_file_path) else {
            return Ok(None);
        };
        Ok(loader.load(path).await?.map(Arc::new))
    }

    async fn attempt(&self, attempt: u32) -> Result<(ExtractPlan, ExtractSummary), AttemptError> {
        let plan = self.plan().await?;
        let schema = self.load_schema().await?;

        let mut sink = AppendSink::new(
            Arc::clone(&self.warehouse),
            self.settings.landing_table.clone(),
            schema,
            self.metrics.clone(),
        );
        let summary = self
            .source
            .extract(&plan.query, self.settings.fetch_size, &mut sink)
            .await?;

        info!(
            attempt,
            batches = summary.batches,
            rows = summary.rows,
            table = %self.settings.landing_table,
            "Extraction attempt reached end of data"
        );
        Ok((plan, summary))
    }

    /// Runs attempts until one reaches the end of the cursor, a fatal error
    /// occurs, or the restart budget is spent.
    pub async fn run(&self) -> Result<ExtractReport, SupervisorError> {
        let mut state = State::Extracting {
            attempt: 1,
            remaining: self.policy.max_restarts,
        };

        loop {
            state = match state {
                State::Extracting { attempt, remaining } => {
                    self.metrics.increment_attempts();
                    info!(attempt, remaining, "Starting extraction attempt");

                    match self.attempt(attempt).await {
                        Ok((plan, summary)) => State::Completed {
                            attempts: attempt,
                            plan,
                            summary,
                        },
                        Err(err) => {
                            error!(attempt, error = %err, "Extraction attempt failed");
                            match classify_attempt_error(&err) {
                                RetryDisposition::Stop => {
                                    return Err(SupervisorError::Fatal {
                                        attempt,
                                        source: err,
                                    });
                                }
                                RetryDisposition::Retry if remaining == 0 => {
                                    State::FailedExhausted {
                                        attempts: attempt,
                                        last: err,
                                    }
                                }
                                RetryDisposition::Retry => {
                                    warn!(
                                        attempt,
                                        remaining,
                                        pause_secs = self.policy.interval.as_secs(),
                                        "Reconnecting after pause"
                                    );
                                    sleep(self.policy.interval).await;
                                    self.metrics.increment_restarts();
                                    State::Extracting {
                                        attempt: attempt.saturating_add(1),
                                        remaining: remaining - 1,
                                    }
                                }
                            }
                        }
                    }
                }
                State::FailedExhausted { attempts, last } => {
                    error!(attempts, "Maximum number of retries exceeded");
                    return Err(SupervisorError::RetriesExhausted { attempts, last });
                }
                State::Completed {
                    attempts,
                    plan,
                    summary,
                } => {
                    let snapshot = self.metrics.snapshot();
                    info!(
                        attempts,
                        rows = summary.rows,
                        total_rows = snapshot.rows_appended,
                        "Extraction complete"
                    );
                    return Ok(ExtractReport {
                        attempts,
                        batches: summary.batches,
                        rows: summary.rows,
                        rows_appended_total: snapshot.rows_appended,
                        lower_bound: plan.lower_bound,
                    });
                }
            };
        }
    }
}
