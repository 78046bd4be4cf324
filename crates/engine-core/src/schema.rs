//! Loads the field schema document that types appended rows.

use crate::error::SchemaError;
use connectors::{blob::BlobStore, error::BlobError};
use model::schema::FieldSchema;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SchemaLoader {
    blobs: Arc<dyn BlobStore>,
}

impl SchemaLoader {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// A missing or undecodable document yields `Ok(None)` and rows are
    /// appended untyped. Transport failures are errors.
    pub async fn load(&self, path: &str) -> Result<Option<FieldSchema>, SchemaError> {
        let bytes = match self.blobs.fetch(path).await {
            Ok(bytes) => bytes,
            Err(BlobError::NotFound(location)) => {
                warn!(path = %location, "Field schema not found, appending untyped rows");
                return Ok(None);
            }
            Err(source) => {
                return Err(SchemaError::Fetch {
                    path: path.to_string(),
                    source,
                });
            }
        };

        match FieldSchema::from_json(&bytes) {
            Ok(schema) => {
                info!(path, fields = schema.fields.len(), "Loaded field schema");
                Ok(Some(schema))
            }
            Err(err) => {
                warn!(path, error = %err, "Field schema could not be decoded, appending untyped rows");
                Ok(None)
            }
        }
    }

    /// Like [`SchemaLoader::load`], but a missing document is an error.
    pub async fn require(&self, path: &str) -> Result<FieldSchema, SchemaError> {
        let bytes = self
            .blobs
            .fetch(path)
            .await
            .map_err(|source| SchemaError::Fetch {
                path: path.to_string(),
                source,
            })?;
        FieldSchema::from_json(&bytes).map_err(|err| SchemaError::Decode {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }
}
