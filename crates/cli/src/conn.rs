use crate::{
    commands::{SourceArgs, WarehouseArgs},
    env::EnvManager,
    error::CliError,
};
use connectors::{
    blob::{BlobStore, ObjectBlobStore},
    source::{SourceConnector, connector_for},
    warehouse::{
        Warehouse,
        bigquery::{BigQueryConfig, BigQueryWarehouse},
    },
};
use model::table::TableRef;
use std::sync::Arc;
use tracing::{error, info};

pub fn source(args: &SourceArgs) -> Result<Arc<dyn SourceConnector>, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &args.env_file {
        env.load_from_file(path)?;
    }
    let config = env.source_config(args.source_kind)?;
    info!(source = ?config, "Source configured");
    Ok(connector_for(config))
}

pub async fn warehouse(args: &WarehouseArgs) -> Result<Arc<dyn Warehouse>, CliError> {
    let warehouse = BigQueryWarehouse::connect(BigQueryConfig {
        project_id: args.project_id.clone(),
        location: args.location.clone(),
        credentials_file: args.credentials_file.clone(),
    })
    .await?;
    Ok(Arc::new(warehouse))
}

pub fn blobs(args: &WarehouseArgs) -> Result<Option<Arc<dyn BlobStore>>, CliError> {
    match args.bucket_name.as_deref() {
        Some(bucket) => Ok(Some(Arc::new(ObjectBlobStore::gcs(bucket)?))),
        None => Ok(None),
    }
}

pub fn require_blobs(args: &WarehouseArgs) -> Result<Arc<dyn BlobStore>, CliError> {
    blobs(args)?.ok_or_else(|| CliError::Config("--bucket-name is required".into()))
}

pub fn table(args: &WarehouseArgs, name: &str) -> TableRef {
    TableRef::new(&args.project_id, &args.dataset, name)
}

pub async fn ping(args: &SourceArgs) -> Result<(), CliError> {
    let source = source(args)?;
    info!(kind = %args.source_kind, "Pinging source");
    source.ping().await.map_err(|e| {
        error!(kind = %args.source_kind, "Source ping failed: {e}");
        CliError::Source(e)
    })?;
    info!(kind = %args.source_kind, "Source ping succeeded");
    Ok(())
}
