//! Moves staged data into the final table with a user-supplied transform.

use crate::error::FinalizeError;
use connectors::{blob::BlobStore, error::WarehouseError, warehouse::Warehouse};
use model::table::TableRef;
use planner::{error::QueryBuildError, query::warehouse::transform_query};
use std::sync::Arc;
use tracing::{error, info};

pub struct Finalizer {
    warehouse: Arc<dyn Warehouse>,
    blobs: Arc<dyn BlobStore>,
}

impl Finalizer {
    pub fn new(warehouse: Arc<dyn Warehouse>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { warehouse, blobs }
    }

    /// Appends the result of the transform query at `sql_path` to
    /// `final_table` as a query job, creating the table when it is missing.
    /// Runs once; failures are reported, not retried.
    pub async fn run(&self, final_table: &TableRef, sql_path: &str) -> Result<(), FinalizeError> {
        let document = |reason: String| FinalizeError::Document {
            path: sql_path.to_string(),
            reason,
        };

        let bytes = self.blobs.fetch(sql_path).await.map_err(|e| {
            error!(path = sql_path, error = %e, "Transform SQL could not be fetched");
            document(e.to_string())
        })?;
        let transform = std::str::from_utf8(&bytes)
            .map_err(|e| document(format!("not valid UTF-8: {e}")))?;

        let sql = transform_query(final_table, transform).map_err(|e| match e {
            QueryBuildError::EmptyQuery => document("document is empty".into()),
            other => FinalizeError::MalformedQuery(other.to_string()),
        })?;

        info!(table = %final_table, path = sql_path, "Loading final table");
        match self.warehouse.query_into(&sql, final_table).await {
            Ok(()) => {
                info!(table = %final_table, "Final table loaded");
                Ok(())
            }
            Err(WarehouseError::MalformedQuery(msg)) => {
                error!(table = %final_table, error = %msg, "Invalid query in transform SQL");
                Err(FinalizeError::MalformedQuery(msg))
            }
            Err(other) => {
                error!(table = %final_table, error = %other, "Unexpected error while loading final table");
                Err(FinalizeError::Unexpected(other))
            }
        }
    }
}
