//! Resolves the high-water mark already present in the landing table.

use crate::error::CheckpointError;
use connectors::warehouse::Warehouse;
use model::{table::TableRef, watermark::Watermark};
use planner::query::warehouse::checkpoint_query;
use std::sync::Arc;
use tracing::{error, info};

pub struct CheckpointResolver {
    warehouse: Arc<dyn Warehouse>,
}

impl CheckpointResolver {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self { warehouse }
    }

    /// Latest day of `column` in `table`. A missing or empty table resolves to
    /// [`Watermark::EPOCH`]; every other failure is returned.
    pub async fn resolve(&self, table: &TableRef, column: &str) -> Result<Watermark, CheckpointError> {
        let sql = checkpoint_query(table, column)?;

        match self.warehouse.query_scalar(&sql).await {
            Ok(Some(text)) => {
                let watermark = Watermark::parse(&text).map_err(|_| {
                    error!(table = %table, value = %text, "Checkpoint value is not a date");
                    CheckpointError::Unparsable {
                        table: table.to_string(),
                        value: text.clone(),
                    }
                })?;
                info!(table = %table, watermark = %watermark, "Latest date loaded");
                Ok(watermark)
            }
            Ok(None) => {
                info!(table = %table, "Landing table is empty, starting from {}", Watermark::EPOCH);
                Ok(Watermark::EPOCH)
            }
            Err(err) if err.is_not_found() => {
                info!(table = %table, "Landing table not found, starting from {}", Watermark::EPOCH);
                Ok(Watermark::EPOCH)
            }
            Err(source) => {
                error!(table = %table, error = %source, "Checkpoint query failed");
                Err(CheckpointError::Warehouse {
                    table: table.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::{error::WarehouseError, warehouse::JsonRow};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    /// Answers every scalar query with a canned result.
    struct Canned {
        answer: Mutex<Option<Result<Option<String>, WarehouseError>>>,
        seen: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(answer: Result<Option<String>, WarehouseError>) -> Arc<Self> {
            Arc::new(Self {
                answer: Mutex::new(Some(answer)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Warehouse for Canned {
        async fn query_scalar(&self, sql: &str) -> Result<Option<String>, WarehouseError> {
            self.seen.lock().unwrap().push(sql.to_string());
            self.answer.lock().unwrap().take().unwrap()
        }

        async fn append_rows(&self, _: &TableRef, _: Vec<JsonRow>) -> Result<(), WarehouseError> {
            unreachable!()
        }

        async fn execute(&self, _: &str) -> Result<(), WarehouseError> {
            unreachable!()
        }

        async fn query_into(&self, _: &str, _: &TableRef) -> Result<(), WarehouseError> {
            unreachable!()
        }
    }

    fn landing() -> TableRef {
        TableRef::new("proj", "ds", "ORDERS_LANDING")
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_table_resolves_to_epoch() {
        let wh = Canned::new(Err(WarehouseError::NotFound("ORDERS_LANDING".into())));
        let resolver = CheckpointResolver::new(wh);
        let w = resolver.resolve(&landing(), "ORDER_DATE").await.unwrap();
        assert_eq!(w, Watermark::EPOCH);
        assert!(logs_contain("Landing table not found"));
    }

    #[tokio::test]
    async fn empty_table_resolves_to_epoch() {
        let resolver = CheckpointResolver::new(Canned::new(Ok(None)));
        let w = resolver.resolve(&landing(), "ORDER_DATE").await.unwrap();
        assert!(w.is_epoch());
    }

    #[tokio::test]
    async fn parses_latest_date() {
        let wh = Canned::new(Ok(Some("15-Mar-2024".into())));
        let resolver = CheckpointResolver::new(wh.clone());
        let w = resolver.resolve(&landing(), "ORDER_DATE").await.unwrap();
        assert_eq!(w.to_string(), "15-Mar-2024");
        assert!(wh.seen.lock().unwrap()[0].contains("MAX(ORDER_DATE)"));
    }

    #[traced_test]
    #[tokio::test]
    async fn other_failures_are_not_masked() {
        let wh = Canned::new(Err(WarehouseError::MalformedQuery("bad column".into())));
        let resolver = CheckpointResolver::new(wh);
        let err = resolver.resolve(&landing(), "ORDER_DATE").await.unwrap_err();
        assert!(matches!(err, CheckpointError::Warehouse { .. }));
        assert!(logs_contain("Checkpoint query failed"));
    }

    #[tokio::test]
    async fn garbage_values_are_rejected() {
        let resolver = CheckpointResolver::new(Canned::new(Ok(Some("soon".into()))));
        let err = resolver.resolve(&landing(), "ORDER_DATE").await.unwrap_err();
        assert!(matches!(err, CheckpointError::Unparsable { value, .. } if value == "soon"));
    }
}
