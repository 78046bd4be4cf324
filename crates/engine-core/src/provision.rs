//! Creates and drops the landing table.

use crate::{error::ProvisionError, schema::SchemaLoader};
use connectors::warehouse::Warehouse;
use model::{schema::FieldSchema, table::TableRef};
use planner::query::warehouse::{create_table, drop_table};
use std::sync::Arc;
use tracing::info;

pub struct Provisioner {
    warehouse: Arc<dyn Warehouse>,
}

impl Provisioner {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self { warehouse }
    }

    pub async fn create_landing_table(
        &self,
        table: &TableRef,
        schema: &FieldSchema,
    ) -> Result<(), ProvisionError> {
        let sql = create_table(table, schema)?;
        self.warehouse.execute(&sql).await?;
        info!(table = %table, fields = schema.fields.len(), "Created landing table");
        Ok(())
    }

    /// Reads the schema document from the bucket and creates the table from it.
    pub async fn create_from_document(
        &self,
        table: &TableRef,
        schemas: &SchemaLoader,
        path: &str,
    ) -> Result<(), ProvisionError> {
        let schema = schemas.require(path).await?;
        if schema.is_empty() {
            return Err(ProvisionError::MissingSchema(table.to_string()));
        }
        self.create_landing_table(table, &schema).await
    }

    pub async fn drop_landing_table(&self, table: &TableRef) -> Result<(), ProvisionError> {
        let sql = drop_table(table)?;
        self.warehouse.execute(&sql).await?;
        info!(table = %table, "Dropped landing table");
        Ok(())
    }
}
