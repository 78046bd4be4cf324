use gcp_bigquery_client::error::BQError;
use thiserror::Error;

/// Errors raised by batch handlers cross the connector seam boxed.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from the relational source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Invalid source configuration: {0}")]
    Config(String),

    #[error("Fetch size must be greater than zero")]
    ZeroFetchSize,
}

/// Why an extraction call stopped before reaching the end of the cursor.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Source failed during extraction: {0}")]
    Source(#[from] SourceError),

    #[error("Batch {batch} could not be handled: {source}")]
    Handler {
        batch: usize,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("{rejected} row(s) rejected by {table}: {details}")]
    RowsRejected {
        table: String,
        rejected: usize,
        details: String,
    },

    #[error("Invalid warehouse credentials: {0}")]
    Credentials(String),

    #[error("Warehouse job {0} did not complete")]
    Incomplete(String),

    #[error("Warehouse job failed: {0}")]
    JobFailed(String),

    #[error("Unexpected value in result: {0}")]
    Decode(String),

    #[error("Warehouse client error: {0}")]
    Client(#[source] BQError),
}

impl WarehouseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WarehouseError::NotFound(_))
    }
}

impl From<BQError> for WarehouseError {
    fn from(error: BQError) -> Self {
        match &error {
            BQError::ResponseError { error: response } => match response.error.code {
                404 => WarehouseError::NotFound(response.error.message.clone()),
                400 => WarehouseError::MalformedQuery(response.error.message.clone()),
                _ => WarehouseError::Client(error),
            },
            _ => WarehouseError::Client(error),
        }
    }
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("Invalid blob store configuration: {0}")]
    Config(String),
}
