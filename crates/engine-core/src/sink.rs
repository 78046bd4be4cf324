use crate::{error::AppendError, metrics::Metrics, provision::Provisioner};
use async_trait::async_trait;
use connectors::{
    error::{BoxError, WarehouseError},
    source::BatchHandler,
    warehouse::{JsonRow, Warehouse},
};
use model::{records::batch::Batch, schema::FieldSchema, table::TableRef};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Appends every batch it receives to the landing table, in arrival order.
/// A missing landing table is created from the field schema, or as STRING
/// columns when there is none, and the append is retried once.
pub struct AppendSink {
    warehouse: Arc<dyn Warehouse>,
    table: TableRef,
    schema: Option<Arc<FieldSchema>>,
    metrics: Metrics,
}

impl AppendSink {
    pub fn new(
        warehouse: Arc<dyn Warehouse>,
        table: TableRef,
        schema: Option<Arc<FieldSchema>>,
        metrics: Metrics,
    ) -> Self {
        Self {
            warehouse,
            table,
            schema,
            metrics,
        }
    }

    fn rows(&self, batch: &Batch) -> Result<Vec<JsonRow>, AppendError> {
        Ok(match &self.schema {
            Some(schema) => schema.conform(batch)?,
            None => batch.to_untyped_json(),
        })
    }

    async fn append(&self, batch: &Batch) -> Result<(), AppendError> {
        match self.warehouse.append_rows(&self.table, self.rows(batch)?).await {
            Err(WarehouseError::NotFound(msg)) => {
                info!(table = %self.table, reason = %msg, "Landing table missing, creating it");
                self.create_table(batch).await?;
                self.send(self.rows(batch)?).await
            }
            other => other.map_err(|source| self.warehouse_error(source)),
        }
    }

    async fn create_table(&self, batch: &Batch) -> Result<(), AppendError> {
        let provisioner = Provisioner::new(Arc::clone(&self.warehouse));
        match &self.schema {
            Some(schema) => provisioner.create_landing_table(&self.table, schema).await?,
            None => {
                let schema = FieldSchema::untyped(&batch.columns);
                provisioner.create_landing_table(&self.table, &schema).await?
            }
        }
        Ok(())
    }

    async fn send(&self, rows: Vec<JsonRow>) -> Result<(), AppendError> {
        self.warehouse
            .append_rows(&self.table, rows)
            .await
            .map_err(|source| self.warehouse_error(source))
    }

    fn warehouse_error(&self, source: WarehouseError) -> AppendError {
        AppendError::Warehouse {
            table: self.table.to_string(),
            source,
        }
    }
}

#[async_trait]
impl BatchHandler for AppendSink {
    async fn handle(&mut self, batch: Batch) -> Result<(), BoxError> {
        if batch.is_empty() {
            return Ok(());
        }

        if let Err(err) = self.append(&batch).await {
            error!(batch = batch.seq, table = %self.table, error = %err, "Append failed");
            return Err(Box::new(err));
        }

        self.metrics.record_batch(batch.len() as u64);
        debug!(batch = batch.seq, rows = batch.len(), table = %self.table, "Appended batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::records::row::TextRow;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        appended: Mutex<Vec<(String, Vec<JsonRow>)>>,
        executed: Mutex<Vec<String>>,
        missing: Mutex<bool>,
    }

    #[async_trait]
    impl Warehouse for Recorder {
        async fn query_scalar(&self, _: &str) -> Result<Option<String>, WarehouseError> {
            Ok(None)
        }

        async fn append_rows(&self, table: &TableRef, rows: Vec<JsonRow>) -> Result<(), WarehouseError> {
            if *self.missing.lock().unwrap() {
                return Err(WarehouseError::NotFound(format!("Table {table}")));
            }
            self.appended.lock().unwrap().push((table.to_string(), rows));
            Ok(())
        }

        async fn execute(&self, sql: &str) -> Result<(), WarehouseError> {
            if sql.starts_with("CREATE TABLE") {
                *self.missing.lock().unwrap() = false;
            }
            self.executed.lock().unwrap().push(sql.to_string());
            Ok(())
        }

        async fn query_into(&self, _: &str, _: &TableRef) -> Result<(), WarehouseError> {
            Ok(())
        }
    }

    fn batch() -> Batch {
        Batch::new(
            1,
            Arc::from(vec!["ORDER_ID".to_string(), "NOTE".to_string()]),
            vec![
                TextRow::new(vec![Some("1".into()), Some("first".into())]),
                TextRow::new(vec![Some("2".into()), None]),
            ],
        )
    }

    #[tokio::test]
    async fn appends_untyped_rows_in_order() {
        let wh = Arc::new(Recorder::default());
        let metrics = Metrics::new();
        let mut sink = AppendSink::new(wh.clone(), TableRef::new("p", "d", "t"), None, metrics.clone());

        sink.handle(batch()).await.unwrap();

        let appended = wh.appended.lock().unwrap();
        assert_eq!(appended.len(), 1);
        let (table, rows) = &appended[0];
        assert_eq!(table, "p.d.t");
        assert_eq!(rows[0]["ORDER_ID"], "1");
        assert_eq!(rows[1]["ORDER_ID"], "2");
        assert!(rows[1]["NOTE"].is_null());
        assert_eq!(metrics.snapshot().rows_appended, 2);
    }

    #[tokio::test]
    async fn schema_violations_fail_the_batch() {
        let schema = FieldSchema::from_json(
            br#"[{"name": "ORDER_ID", "type": "INTEGER"}, {"name": "NOTE", "type": "STRING", "mode": "REQUIRED"}]"#,
        )
        .unwrap();
        let wh = Arc::new(Recorder::default());
        let mut sink = AppendSink::new(
            wh.clone(),
            TableRef::new("p", "d", "t"),
            Some(Arc::new(schema)),
            Metrics::new(),
        );

        let err = sink.handle(batch()).await.unwrap_err();
        assert!(err.to_string().contains("REQUIRED"));
        assert!(wh.appended.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_table_is_created_untyped_then_appended() {
        let wh = Arc::new(Recorder {
            missing: Mutex::new(true),
            ..Default::default()
        });
        let mut sink = AppendSink::new(wh.clone(), TableRef::new("p", "d", "t"), None, Metrics::new());

        sink.handle(batch()).await.unwrap();

        let executed = wh.executed.lock().unwrap();
        assert_eq!(executed.len(), 1);
        assert!(executed[0].starts_with("CREATE TABLE IF NOT EXISTS `p.d.t`"));
        assert!(executed[0].contains("`ORDER_ID` STRING"));
        assert!(executed[0].contains("`NOTE` STRING"));
        assert_eq!(wh.appended.lock().unwrap()[0].1.len(), 2);
    }

    #[tokio::test]
    async fn missing_table_uses_field_schema() {
        let schema = FieldSchema::from_json(
            br#"[{"name": "ORDER_ID", "type": "INTEGER"}, {"name": "NOTE", "type": "STRING"}]"#,
        )
        .unwrap();
        let wh = Arc::new(Recorder {
            missing: Mutex::new(true),
            ..Default::default()
        });
        let mut sink = AppendSink::new(
            wh.clone(),
            TableRef::new("p", "d", "t"),
            Some(Arc::new(schema)),
            Metrics::new(),
        );

        sink.handle(batch()).await.unwrap();

        assert!(wh.executed.lock().unwrap()[0].contains("`ORDER_ID` INT64"));
        assert_eq!(wh.appended.lock().unwrap()[0].1[0]["ORDER_ID"], "1");
    }
}
