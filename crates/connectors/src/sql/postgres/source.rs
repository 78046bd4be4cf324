use crate::{
    error::{ExtractError, SourceError},
    source::{BatchHandler, ExtractSummary, SourceConfig, SourceConnector},
    sql::{
        batcher::Batcher,
        postgres::{
            connect::{connect_client, pg_config},
            decode::{decode_row, text_cast_query},
        },
    },
};
use async_trait::async_trait;
use futures_util::{TryStreamExt, pin_mut};
use model::records::row::TextRow;
use planner::query::dialect::{Dialect, Postgres};
use tokio_postgres::types::ToSql;
use tracing::{debug, info};

pub struct PgSource {
    config: SourceConfig,
}

impl PgSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SourceConnector for PgSource {
    fn dialect(&self) -> Box<dyn Dialect> {
        Box::new(Postgres)
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

        let client = connect_client(pg_config(&self.config)?).await?;
        info!(host = %self.config.host, db = %self.config.instance, "Connected to Postgres source");

        let mut statement = client.prepare(query).await.map_err(SourceError::from)?;
        let cast = {
            let described = statement
                .columns()
                .iter()
                .map(|c| (c.name(), c.type_()))
                .collect::<Vec<_>>();
            text_cast_query(query, &described)
        };
        if let Some(cast) = cast {
            debug!(query = %cast, "Fetching unlisted column types as text");
            statement = client.prepare(&cast).await.map_err(SourceError::from)?;
        }

        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>();
        debug!(columns = columns.len(), "Prepared extraction statement");

        let stream = client
            .query_raw(&statement, std::iter::empty::<&(dyn ToSql + Sync)>())
            .await
            .map_err(SourceError::from)?;
        pin_mut!(stream);

        let mut batcher = Batcher::new(handler, fetch_size, columns);
        while let Some(row) = stream.try_next().await.map_err(SourceError::from)? {
            batcher.push(TextRow::from_values(decode_row(&row))).await?;
        }

        batcher.finish().await
    }

    async fn ping(&self) -> Result<(), SourceError> {
        let client = connect_client(pg_config(&self.config)?).await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }
}
