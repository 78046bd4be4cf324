use crate::{
    error::{ExtractError, SourceError},
    source::{BatchHandler, ExtractSummary, SourceConfig, SourceConnector},
    sql::{batcher::Batcher, mysql::decode::decode_row},
};
use async_trait::async_trait;
use model::records::row::TextRow;
use mysql_async::{Conn, OptsBuilder, prelude::Queryable};
use planner::query::dialect::{Dialect, MySql};
use tracing::{debug, info, warn};

pub struct MySqlSource {
    config: SourceConfig,
}

impl MySqlSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn opts(&self) -> OptsBuilder {
        OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.port)
            .db_name(Some(self.config.instance.clone()))
            .user(Some(self.config.user.clone()))
            .pass(Some(self.config.password.clone()))
    }

    async fn connect(&self) -> Result<Conn, SourceError> {
        let conn = Conn::new(self.opts()).await?;
        info!(host = %self.config.host, db = %self.config.instance, "Connected to MySQL source");
        Ok(conn)
    }
}

#[async_trait]
impl SourceConnector for MySqlSource {
    fn dialect(&self) -> Box<dyn Dialect> {
        Box::new(MySql)
    }

    async fn extract(
        &self,
        query: &str,
        fetch_size: usize,
        handler: &mut dyn BatchHandler,
    ) -> Result<ExtractSummary, ExtractError> {
        if fetch_size == 0 {
            return Err(SourceError::ZeroFetchSize.into());
        }

        let mut conn = self.connect().await?;
        let outcome = stream_rows(&mut conn, query, fetch_size, handler).await;

        if let Err(error) = conn.disconnect().await {
            warn!(%error, "MySQL disconnect failed");
        }
        outcome
    }

    async fn ping(&self) -> Result<(), SourceError> {
        let mut conn = self.connect().await?;
        conn.ping().await?;
        conn.disconnect().await?;
        Ok(())
    }
}

async fn stream_rows(
    conn: &mut Conn,
    query: &str,
    fetch_size: usize,
    handler: &mut dyn BatchHandler,
) -> Result<ExtractSummary, ExtractError> {
    let mut result = conn.query_iter(query).await.map_err(SourceError::from)?;

    let columns = result
        .columns_ref()
        .iter()
        .map(|c| c.name_str().into_owned())
        .collect::<Vec<_>>();
    debug!(columns = columns.len(), "Opened extraction cursor");

    let mut batcher = Batcher::new(handler, fetch_size, columns);
    while let Some(row) = result.next().await.map_err(SourceError::from)? {
        batcher.push(TextRow::from_values(decode_row(&row))).await?;
    }

    batcher.finish().await
}
