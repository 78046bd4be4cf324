use crate::{
    commands::{ExtractArgs, FinalizeArgs, SourceArgs, WarehouseArgs},
    error::CliError,
};
use clap::Parser;
use commands::Commands;
use engine_core::{
    finalize::Finalizer,
    pipeline,
    provision::Provisioner,
    retry::RestartPolicy,
    schema::SchemaLoader,
    settings::{ExtractSettings, FinalizeSettings},
    supervisor::Supervisor,
};
use connectors::warehouse::Warehouse;
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "tidewater",
    version = "0.1.0",
    about = "Incremental extraction from relational sources into BigQuery"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            warehouse,
            extract,
            finalize,
            output,
        } => {
            let client = conn::warehouse(&warehouse).await?;
            let supervisor = build_supervisor(&source, &warehouse, &extract, Arc::clone(&client))?;
            let finalizer = Finalizer::new(client, conn::require_blobs(&warehouse)?);
            let settings = finalize_settings(&warehouse, &finalize);

            let report = pipeline::run(&supervisor, &finalizer, &settings).await?;
            output::emit_report(&report, output.as_deref()).await?;
        }
        Commands::Extract {
            source,
            warehouse,
            extract,
            output,
        } => {
            let client = conn::warehouse(&warehouse).await?;
            let supervisor = build_supervisor(&source, &warehouse, &extract, client)?;
            let report = supervisor.run().await?;
            output::emit_report(&report, output.as_deref()).await?;
        }
        Commands::Finalize {
            warehouse,
            finalize,
        } => {
            let finalizer = Finalizer::new(
                conn::warehouse(&warehouse).await?,
                conn::require_blobs(&warehouse)?,
            );
            let settings = finalize_settings(&warehouse, &finalize);
            finalizer
                .run(&settings.final_table, &settings.sql_file_path)
                .await?;
        }
        Commands::CreateTable {
            warehouse,
            landing_table,
            schema_file_path,
        } => {
            let schemas = SchemaLoader::new(conn::require_blobs(&warehouse)?);
            let table = conn::table(&warehouse, &landing_table);
            Provisioner::new(conn::warehouse(&warehouse).await?)
                .create_from_document(&table, &schemas, &schema_file_path)
                .await?;
        }
        Commands::DropTable {
            warehouse,
            landing_table,
        } => {
            let table = conn::table(&warehouse, &landing_table);
            Provisioner::new(conn::warehouse(&warehouse).await?)
                .drop_landing_table(&table)
                .await?;
        }
        Commands::Plan {
            source,
            warehouse,
            extract,
            json,
        } => {
            let client = conn::warehouse(&warehouse).await?;
            let supervisor = build_supervisor(&source, &warehouse, &extract, client)?;
            let plan = supervisor.plan().await?;
            if json {
                output::print_report(&plan)?;
            } else {
                println!("{}", plan.query);
            }
        }
        Commands::TestConn { source } => {
            conn::ping(&source).await?;
        }
    }

    Ok(())
}

fn extract_settings(warehouse: &WarehouseArgs, extract: &ExtractArgs) -> ExtractSettings {
    let mut settings = ExtractSettings::new(
        extract.source_table.clone(),
        conn::table(warehouse, &extract.landing_table),
    );
    settings.where_condition_column = extract.where_condition_column.clone();
    settings.start_condition = extract.start_condition;
    settings.end_condition = extract.end_condition;
    settings.fetch_size = extract.fetch_size;
    settings.schema_file_path = extract.schema_file_path.clone();
    settings
}

fn finalize_settings(warehouse: &WarehouseArgs, finalize: &FinalizeArgs) -> FinalizeSettings {
    FinalizeSettings {
        final_table: conn::table(warehouse, &finalize.final_table),
        sql_file_path: finalize.sql_file_path.clone(),
    }
}

fn build_supervisor(
    source: &SourceArgs,
    warehouse: &WarehouseArgs,
    extract: &ExtractArgs,
    client: Arc<dyn Warehouse>,
) -> Result<Supervisor, CliError> {
    let settings = extract_settings(warehouse, extract);
    let blobs = conn::blobs(warehouse)?;
    if settings.schema_file_path.is_some() && blobs.is_none() {
        return Err(CliError::Config(
            "--schema-file-path needs --bucket-name".into(),
        ));
    }

    let policy = RestartPolicy::new(
        extract.max_retries,
        Duration::from_secs(extract.retry_interval_secs),
    );
    info!(
        source_table = %settings.source_table,
        landing_table = %settings.landing_table,
        fetch_size = settings.fetch_size,
        max_retries = policy.max_restarts,
        "Extraction configured"
    );

    Ok(Supervisor::new(
        conn::source(source)?,
        client,
        blobs,
        settings,
        policy,
    ))
}
