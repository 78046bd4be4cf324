use crate::{error::SourceError, source::SourceConfig};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, Config, NoTls, config::SslMode};
use tracing::{error, warn};

pub(crate) fn pg_config(source: &SourceConfig) -> Result<Config, SourceError> {
    let ssl_mode = match source.ssl_mode.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("prefer") => SslMode::Prefer,
        Some("disable") => SslMode::Disable,
        Some("require") => SslMode::Require,
        Some(other) => {
            return Err(SourceError::Config(format!("unsupported ssl mode '{other}'")));
        }
    };

    let mut config = Config::new();
    config
        .host(&source.host)
        .port(source.port)
        .dbname(&source.instance)
        .user(&source.user)
        .password(&source.password)
        .application_name("tidewater")
        .ssl_mode(ssl_mode);
    Ok(config)
}

pub(crate) async fn connect_client(config: Config) -> Result<Client, SourceError> {
    match config.get_ssl_mode() {
        SslMode::Disable => connect_without_tls(config).await,
        SslMode::Prefer => match connect_with_tls(config.clone()).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "Postgres TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

async fn connect_with_tls(config: Config) -> Result<Client, SourceError> {
    let connector = TlsConnector::builder().build()?;
    let tls = MakeTlsConnector::new(connector);
    let (client, connection) = config.connect(tls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}

async fn connect_without_tls(config: Config) -> Result<Client, SourceError> {
    let (client, connection) = config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}
