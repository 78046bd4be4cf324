#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use connectors::{
    blob::{BlobStore, ObjectBlobStore},
    error::{ExtractError, SourceError, WarehouseError},
    source::{BatchHandler, ExtractSummary, SourceConnector},
    warehouse::{JsonRow, Warehouse},
};
use engine_core::settings::ExtractSettings;
use model::{
    records::{batch::Batch, row::TextRow},
    table::TableRef,
    watermark::Watermark,
};
use object_store::{ObjectStore, PutPayload, memory::InMemory, path::Path};
use planner::query::dialect::{Dialect, Postgres};
use serde_json::Value as JsonValue;
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

pub const PROJECT: &str = "acme-data";
pub const DATASET: &str = "staging";

pub fn landing() -> TableRef {
    TableRef::new(PROJECT, DATASET, "ORDERS_LANDING")
}

pub fn orders_settings(fetch_size: usize) -> ExtractSettings {
    let mut settings = ExtractSettings::new("ORDERS", landing());
    settings.where_condition_column = Some("ORDER_DATE".into());
    settings.fetch_size = fetch_size;
    settings
}

/// What one `extract` call returns.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub rows: Vec<Vec<Option<String>>>,
    /// Fail with a connection error once this many batches were handed out.
    pub fail_after_batches: Option<usize>,
}

impl Script {
    pub fn rows(rows: &[&[Option<&str>]]) -> Self {
        Script {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.map(str::to_string)).collect())
                .collect(),
            fail_after_batches: None,
        }
    }

    pub fn failing_after(mut self, batches: usize) -> Self {
        self.fail_after_batches = Some(batches);
        self
    }

    pub fn failing() -> Self {
        Script::default().failing_after(0)
    }
}

/// A source that answers each extraction with the next scripted result and
/// records the queries it was given. Once the script runs out every call
/// replays the last entry.
pub struct ScriptedSource {
    columns: Vec<String>,
    scripts: Mutex<VecDeque<Script>>,
    last: Mutex<Script>,
    pub queries: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(columns: &[&str], scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            scripts: Mutex::new(scripts.into()),
            last: Mutex::new(Script::default()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn next_script(&self) -> Script {
        let mut scripts = self.scripts.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(script) = scripts.pop_front() {
            *last = script;
        }
        last.clone()
    }
}

#[async_trait]
impl SourceConnector for ScriptedSource {
    fn dialect(&self) -> Box<dyn Dialect> {
        Box::new(Postgres)
    }

    async fn extract(
        &self,
        query: &str,
        fetch_size: usize,
        handler: &mut dyn BatchHandler,
    ) -> Result<ExtractSummary, ExtractError> {
        self.queries.lock().unwrap().push(query.to_string());
        let script = self.next_script();
        let columns: Arc<[String]> = Arc::from(self.columns.clone());

        let mut summary = ExtractSummary::default();
        for chunk in script.rows.chunks(fetch_size) {
            if script.fail_after_batches == Some(summary.batches) {
                break;
            }
            let seq = summary.batches + 1;
            let rows = chunk.iter().cloned().map(TextRow::new).collect();
            handler
                .handle(Batch::new(seq, Arc::clone(&columns), rows))
                .await
                .map_err(|source| ExtractError::Handler { batch: seq, source })?;
            summary.batches = seq;
            summary.rows += chunk.len();
        }

        if script.fail_after_batches.is_some() {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))
            .into());
        }
        Ok(summary)
    }

    async fn ping(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// In-memory warehouse. Tables are keyed by `project.dataset.table` and
/// must exist before rows are appended; the checkpoint query is answered
/// from the stored rows.
pub struct FakeWarehouse {
    checkpoint_column: String,
    pub tables: Mutex<HashMap<String, Vec<JsonRow>>>,
    pub executed: Mutex<Vec<String>>,
    /// `(destination, query)` of every query job.
    pub loaded: Mutex<Vec<(String, String)>>,
    pub scalar_error: Mutex<Option<WarehouseError>>,
    pub execute_error: Mutex<Option<WarehouseError>>,
    pub load_error: Mutex<Option<WarehouseError>>,
    /// Appends to reject, counted from the first append.
    pub reject_appends: Mutex<VecDeque<bool>>,
}

impl FakeWarehouse {
    pub fn new(checkpoint_column: &str) -> Arc<Self> {
        Arc::new(Self {
            checkpoint_column: checkpoint_column.to_string(),
            tables: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
            loaded: Mutex::new(Vec::new()),
            scalar_error: Mutex::new(None),
            execute_error: Mutex::new(None),
            load_error: Mutex::new(None),
            reject_appends: Mutex::new(VecDeque::new()),
        })
    }

    pub fn rows(&self, table: &TableRef) -> Vec<JsonRow> {
        self.tables
            .lock()
            .unwrap()
            .get(&table.to_string())
            .cloned()
            .unwrap_or_default()
    }

    fn table_in(sql: &str) -> Option<String> {
        let start = sql.find('`')? + 1;
        let end = start + sql[start..].find('`')?;
        Some(sql[start..end].to_string())
    }

    fn max_date(&self, rows: &[JsonRow]) -> Option<Watermark> {
        rows.iter()
            .filter_map(|row| match row.get(&self.checkpoint_column) {
                Some(JsonValue::String(text)) => text.get(..10),
                _ => None,
            })
            .filter_map(|day| Watermark::parse(day).ok())
            .max()
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn query_scalar(&self, sql: &str) -> Result<Option<String>, WarehouseError> {
        if let Some(err) = self.scalar_error.lock().unwrap().take() {
            return Err(err);
        }
        let table = Self::table_in(sql).ok_or_else(|| WarehouseError::MalformedQuery(sql.into()))?;
        let tables = self.tables.lock().unwrap();
        let rows = tables
            .get(&table)
            .ok_or_else(|| WarehouseError::NotFound(format!("Table {table} not found")))?;
        Ok(self.max_date(rows).map(|w| w.to_string()))
    }

    async fn append_rows(&self, table: &TableRef, rows: Vec<JsonRow>) -> Result<(), WarehouseError> {
        if !self.tables.lock().unwrap().contains_key(&table.to_string()) {
            return Err(WarehouseError::NotFound(format!("Table {table} not found")));
        }
        if self.reject_appends.lock().unwrap().pop_front().unwrap_or(false) {
            return Err(WarehouseError::RowsRejected {
                table: table.to_string(),
                rejected: rows.len(),
                details: "quota exceeded".into(),
            });
        }
        if let Some(stored) = self.tables.lock().unwrap().get_mut(&table.to_string()) {
            stored.extend(rows);
        }
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<(), WarehouseError> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(err) = self.execute_error.lock().unwrap().take() {
            return Err(err);
        }
        let Some(table) = Self::table_in(sql) else {
            return Ok(());
        };
        let mut tables = self.tables.lock().unwrap();
        if sql.starts_with("CREATE TABLE") {
            tables.entry(table).or_default();
        } else if sql.starts_with("DROP TABLE") {
            tables.remove(&table);
        }
        Ok(())
    }

    async fn query_into(&self, sql: &str, destination: &TableRef) -> Result<(), WarehouseError> {
        self.loaded
            .lock()
            .unwrap()
            .push((destination.to_string(), sql.to_string()));
        if let Some(err) = self.load_error.lock().unwrap().take() {
            return Err(err);
        }
        self.tables
            .lock()
            .unwrap()
            .entry(destination.to_string())
            .or_default();
        Ok(())
    }
}

pub async fn blobs_with(objects: &[(&str, &'static str)]) -> Arc<dyn BlobStore> {
    let store = Arc::new(InMemory::new());
    for (path, body) in objects {
        store
            .put(&Path::from(*path), PutPayload::from(Bytes::from_static(body.as_bytes())))
            .await
            .unwrap();
    }
    Arc::new(ObjectBlobStore::new(store, "acme-bucket"))
}
