//! Read access to the documents (field schema, transform SQL) kept in a
//! storage bucket.

use crate::error::BlobError;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::{ObjectStore, gcp::GoogleCloudStorageBuilder, path::Path};
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Bytes, BlobError>;
}

pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectBlobStore {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// A Cloud Storage bucket, authenticated from the environment.
    pub fn gcs(bucket: &str) -> Result<Self, BlobError> {
        if bucket.is_empty() {
            return Err(BlobError::Config("bucket name is empty".into()));
        }
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()?;
        Ok(Self::new(Arc::new(store), bucket))
    }
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn fetch(&self, path: &str) -> Result<Bytes, BlobError> {
        let location = Path::from(path.trim_start_matches('/'));
        debug!(bucket = %self.bucket, path = %location, "Fetching object");

        let result = match self.store.get(&location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(BlobError::NotFound(format!("gs://{}/{location}", self.bucket)));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(result.bytes().await?)
    }
}
