//! The seam between the extraction loop and a relational source.

use crate::{
    error::{BoxError, ExtractError, SourceError},
    sql::{mysql::source::MySqlSource, postgres::source::PgSource},
};
use async_trait::async_trait;
use model::records::batch::Batch;
use planner::query::dialect::Dialect;
use std::{fmt, str::FromStr, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Postgres,
    MySql,
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(SourceKind::Postgres),
            "mysql" | "mariadb" => Ok(SourceKind::MySql),
            other => Err(SourceError::Config(format!("unsupported source kind '{other}'"))),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Postgres => f.write_str("postgres"),
            SourceKind::MySql => f.write_str("mysql"),
        }
    }
}

/// Connection coordinates of the source database. `instance` names the
/// database to connect to.
#[derive(Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub host: String,
    pub port: u16,
    pub instance: String,
    pub user: String,
    pub password: String,
    /// `disable`, `prefer` or `require`; Postgres only.
    pub ssl_mode: Option<String>,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("instance", &self.instance)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Totals for one completed pass over the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub batches: usize,
    pub rows: usize,
}

/// Receives batches in source order. An error aborts the extraction.
#[async_trait]
pub trait BatchHandler: Send {
    async fn handle(&mut self, batch: Batch) -> Result<(), BoxError>;
}

#[async_trait]
pub trait SourceConnector: Send + Sync {
    fn dialect(&self) -> Box<dyn Dialect>;

    /// Runs `query` on a fresh connection and feeds the result to `handler`
    /// in batches of at most `fetch_size` rows. The connection lives only for
    /// the duration of the call.
    async fn extract(
        &self,
        query: &str,
        fetch_size: usize,
        handler: &mut dyn BatchHandler,
    ) -> Result<ExtractSummary, ExtractError>;

    /// Verifies the source accepts connections and queries.
    async fn ping(&self) -> Result<(), SourceError>;
}

pub fn connector_for(config: SourceConfig) -> Arc<dyn SourceConnector> {
    match config.kind {
        SourceKind::Postgres => Arc::new(PgSource::new(config)),
        SourceKind::MySql => Arc::new(MySqlSource::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kinds() {
        assert_eq!("Postgres".parse::<SourceKind>().unwrap(), SourceKind::Postgres);
        assert_eq!("mysql".parse::<SourceKind>().unwrap(), SourceKind::MySql);
        assert!("oracle".parse::<SourceKind>().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let config = SourceConfig {
            kind: SourceKind::Postgres,
            host: "db".into(),
            port: 5432,
            instance: "sales".into(),
            user: "loader".into(),
            password: "hunter2".into(),
            ssl_mode: None,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
