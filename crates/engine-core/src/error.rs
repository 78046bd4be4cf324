use connectors::error::{BlobError, ExtractError, WarehouseError};
use model::schema::ConformError;
use planner::error::QueryBuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint query could not be built: {0}")]
    Query(#[from] QueryBuildError),

    #[error("Checkpoint query on {table} failed: {source}")]
    Warehouse {
        table: String,
        #[source]
        source: WarehouseError,
    },

    #[error("Checkpoint value '{value}' from {table} is not a date")]
    Unparsable { table: String, value: String },
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Field schema {path} could not be fetched: {source}")]
    Fetch {
        path: String,
        #[source]
        source: BlobError,
    },

    #[error("Field schema {path} is invalid: {reason}")]
    Decode { path: String, reason: String },
}

#[derive(Error, Debug)]
pub enum AppendError {
    #[error("Batch does not fit the field schema: {0}")]
    Conform(#[from] ConformError),

    #[error("Append to {table} failed: {source}")]
    Warehouse {
        table: String,
        #[source]
        source: WarehouseError,
    },

    #[error("Landing table could not be created: {0}")]
    Provision(#[from] ProvisionError),
}

/// Failure of a single extraction attempt.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("Extraction query could not be built: {0}")]
    Query(#[from] QueryBuildError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Extraction stopped on attempt {attempt}: {source}")]
    Fatal {
        attempt: u32,
        #[source]
        source: AttemptError,
    },

    #[error("Maximum number of retries exceeded after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: AttemptError,
    },
}

#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("Transform SQL {path} is unavailable: {reason}")]
    Document { path: String, reason: String },

    #[error("Transform query is malformed: {0}")]
    MalformedQuery(String),

    #[error("Transform failed: {0}")]
    Unexpected(#[source] WarehouseError),
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Field schema is required to create {0}")]
    MissingSchema(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Statement could not be built: {0}")]
    Query(#[from] QueryBuildError),

    #[error("Warehouse rejected statement: {0}")]
    Warehouse(#[from] WarehouseError),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] SupervisorError),

    #[error(transparent)]
    Finalize(#[from] FinalizeError),
}
