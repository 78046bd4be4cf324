use connectors::error::{BlobError, SourceError, WarehouseError};
use engine_core::error::{
    AttemptError, FinalizeError, PipelineError, ProvisionError, SupervisorError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error("Bucket error: {0}")]
    Blob(#[from] BlobError),

    #[error("Failed to plan the extraction: {0}")]
    Plan(#[from] AttemptError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] SupervisorError),

    #[error("Finalize failed: {0}")]
    Finalize(#[from] FinalizeError),

    #[error("Provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Run failed: {0}")]
    Pipeline(#[from] PipelineError),
}
