use crate::{
    error::WarehouseError,
    warehouse::{JsonRow, Warehouse},
};
use async_trait::async_trait;
use gcp_bigquery_client::{
    Client,
    model::{
        get_query_results_parameters::GetQueryResultsParameters, job::Job,
        job_configuration::JobConfiguration, job_configuration_query::JobConfigurationQuery,
        job_reference::JobReference, query_request::QueryRequest, query_response::QueryResponse,
        table_data_insert_all_request::TableDataInsertAllRequest,
        table_data_insert_all_request_rows::TableDataInsertAllRequestRows,
        table_reference::TableReference,
    },
};
use model::table::TableRef;
use serde_json::Value as JsonValue;
use std::{path::PathBuf, time::Duration};
use tracing::{debug, info, warn};

/// Jobs still running after this many result polls are reported incomplete.
const MAX_POLLS: usize = 720;
const POLL_TIMEOUT_MS: i32 = 10_000;
const JOB_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Rows per streaming insert request.
const MAX_INSERT_ROWS: usize = 500;
/// Serialized payload per streaming insert request, under the 10 MB limit.
const MAX_INSERT_BYTES: usize = 9 * 1024 * 1024;
/// Envelope added around each row in the request body.
const ROW_OVERHEAD_BYTES: usize = 16;

/// Splits rows into consecutive request-sized chunks, keeping their order.
/// A single row larger than `max_bytes` still travels alone.
pub(crate) fn chunk_rows(rows: Vec<JsonRow>, max_rows: usize, max_bytes: usize) -> Vec<Vec<JsonRow>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut current_bytes = 0;

    for row in rows {
        let size = serde_json::to_string(&row).map_or(0, |json| json.len()) + ROW_OVERHEAD_BYTES;
        if !current.is_empty() && (current.len() >= max_rows || current_bytes + size > max_bytes) {
            chunks.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current_bytes += size;
        current.push(row);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Maps a failed job's error result onto the warehouse error kinds.
fn job_error(reason: Option<&str>, message: String) -> WarehouseError {
    match reason {
        Some("invalidQuery") => WarehouseError::MalformedQuery(message),
        Some("notFound") => WarehouseError::NotFound(message),
        _ => WarehouseError::JobFailed(message),
    }
}

#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    pub project_id: String,
    pub location: String,
    /// Service-account key file; Application Default Credentials otherwise.
    pub credentials_file: Option<PathBuf>,
}

pub struct BigQueryWarehouse {
    client: Client,
    project_id: String,
    location: String,
}

impl BigQueryWarehouse {
    pub async fn connect(config: BigQueryConfig) -> Result<Self, WarehouseError> {
        let client = match &config.credentials_file {
            Some(path) => {
                let key = gcp_bigquery_client::yup_oauth2::read_service_account_key(path)
                    .await
                    .map_err(|e| {
                        WarehouseError::Credentials(format!(
                            "unreadable key file '{}': {e}",
                            path.display()
                        ))
                    })?;
                Client::from_service_account_key(key, false).await?
            }
            None => Client::from_application_default_credentials().await?,
        };

        info!(project = %config.project_id, location = %config.location, "Connected to BigQuery");
        Ok(Self {
            client,
            project_id: config.project_id,
            location: config.location,
        })
    }

    fn request(&self, sql: &str) -> QueryRequest {
        let mut request = QueryRequest::new(sql);
        request.location = Some(self.location.clone());
        request
    }

    /// Polls a job until BigQuery reports it complete.
    async fn wait_for(&self, response: &QueryResponse) -> Result<(), WarehouseError> {
        if response.job_complete.unwrap_or(true) {
            return Ok(());
        }

        let job_id = response
            .job_reference
            .as_ref()
            .and_then(|r| r.job_id.clone())
            .ok_or_else(|| WarehouseError::Incomplete("<unknown>".into()))?;

        for poll in 1..=MAX_POLLS {
            let params = GetQueryResultsParameters {
                location: Some(self.location.clone()),
                timeout_ms: Some(POLL_TIMEOUT_MS),
                max_results: Some(0),
                ..Default::default()
            };
            let results = self
                .client
                .job()
                .get_query_results(&self.project_id, &job_id, params)
                .await?;
            if results.job_complete.unwrap_or(false) {
                return Ok(());
            }
            debug!(job_id = %job_id, poll, "Waiting for BigQuery job");
        }

        Err(WarehouseError::Incomplete(job_id))
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn query_scalar(&self, sql: &str) -> Result<Option<String>, WarehouseError> {
        let response = self
            .client
            .job()
            .query(&self.project_id, self.request(sql))
            .await?;

        let response = if response.job_complete.unwrap_or(true) {
            response
        } else {
            // Rerun once the job is done so the rows come back inline.
            self.wait_for(&response).await?;
            self.client
                .job()
                .query(&self.project_id, self.request(sql))
                .await?
        };

        let cell = response
            .rows
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.columns)
            .and_then(|cols| cols.into_iter().next())
            .and_then(|cell| cell.value);

        match cell {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(text)) => Ok(Some(text)),
            Some(other) => Err(WarehouseError::Decode(other.to_string())),
        }
    }

    async fn append_rows(&self, table: &TableRef, rows: Vec<JsonRow>) -> Result<(), WarehouseError> {
        if rows.is_empty() {
            return Ok(());
        }

        let count = rows.len();
        let mut offset = 0;
        for chunk in chunk_rows(rows, MAX_INSERT_ROWS, MAX_INSERT_BYTES) {
            let chunk_len = chunk.len();
            let mut request = TableDataInsertAllRequest::new();
            request
                .add_rows(
                    chunk
                        .into_iter()
                        .map(|row| TableDataInsertAllRequestRows {
                            insert_id: None,
                            json: JsonValue::Object(row),
                        })
                        .collect(),
                )
                .map_err(|e| WarehouseError::Decode(e.to_string()))?;

            let response = self
                .client
                .tabledata()
                .insert_all(&table.project, &table.dataset, &table.table, request)
                .await?;

            if let Some(errors) = response.insert_errors
                && !errors.is_empty()
            {
                let details = errors
                    .iter()
                    .take(5)
                    .map(|e| {
                        let row = offset + e.index.unwrap_or(0) as usize;
                        format!("row {row}: {:?}", e.errors)
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!(table = %table, rejected = errors.len(), "BigQuery rejected rows");
                return Err(WarehouseError::RowsRejected {
                    table: table.to_string(),
                    rejected: errors.len(),
                    details,
                });
            }

            offset += chunk_len;
            debug!(table = %table, rows = chunk_len, sent = offset, "Inserted chunk");
        }

        debug!(table = %table, rows = count, "Appended rows");
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<(), WarehouseError> {
        let response = self
            .client
            .job()
            .query(&self.project_id, self.request(sql))
            .await?;
        self.wait_for(&response).await
    }

    async fn query_into(&self, sql: &str, destination: &TableRef) -> Result<(), WarehouseError> {
        let job = Job {
            configuration: Some(JobConfiguration {
                query: Some(JobConfigurationQuery {
                    query: sql.to_string(),
                    destination_table: Some(TableReference::new(
                        &destination.project,
                        &destination.dataset,
                        &destination.table,
                    )),
                    write_disposition: Some("WRITE_APPEND".into()),
                    create_disposition: Some("CREATE_IF_NEEDED".into()),
                    use_legacy_sql: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            job_reference: Some(JobReference {
                project_id: Some(self.project_id.clone()),
                location: Some(self.location.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let mut job = self.client.job().insert(&self.project_id, job).await?;
        let job_id = job
            .job_reference
            .as_ref()
            .and_then(|r| r.job_id.clone())
            .ok_or_else(|| WarehouseError::Incomplete("<unknown>".into()))?;
        info!(job_id = %job_id, destination = %destination, "Submitted query job");

        for poll in 1..=MAX_POLLS {
            if let Some(status) = &job.status
                && status.state.as_deref() == Some("DONE")
            {
                return match &status.error_result {
                    Some(error) => Err(job_error(
                        error.reason.as_deref(),
                        error.message.clone().unwrap_or_default(),
                    )),
                    None => Ok(()),
                };
            }

            debug!(job_id = %job_id, poll, "Waiting for BigQuery job");
            tokio::time::sleep(JOB_POLL_INTERVAL).await;
            job = self
                .client
                .job()
                .get_job(&self.project_id, &job_id, Some(&self.location))
                .await?;
        }

        Err(WarehouseError::Incomplete(job_id))
    }
}
