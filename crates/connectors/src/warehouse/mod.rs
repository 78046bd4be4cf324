//! Destination operations the loader needs from the analytical store.

use crate::error::WarehouseError;
use async_trait::async_trait;
use model::table::TableRef;
use serde_json::{Map, Value as JsonValue};

pub mod bigquery;

pub type JsonRow = Map<String, JsonValue>;

#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Runs a query and returns the first column of its first row as text.
    /// `Ok(None)` covers both an empty result and a NULL cell. A missing
    /// table surfaces as [`WarehouseError::NotFound`].
    async fn query_scalar(&self, sql: &str) -> Result<Option<String>, WarehouseError>;

    /// Appends rows to `table` in the given order.
    async fn append_rows(&self, table: &TableRef, rows: Vec<JsonRow>) -> Result<(), WarehouseError>;

    /// Runs a statement and waits for it to complete.
    async fn execute(&self, sql: &str) -> Result<(), WarehouseError>;

    /// Runs a query and appends its result to `destination`, creating the
    /// table from the result shape when it does not exist yet.
    async fn query_into(&self, sql: &str, destination: &TableRef) -> Result<(), WarehouseError>;
}
