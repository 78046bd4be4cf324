use clap::{Args, Subcommand, builder::RangedU64ValueParser};
use connectors::source::SourceKind;
use engine_core::settings::{DEFAULT_FETCH_SIZE, DEFAULT_MAX_RETRIES, MAX_FETCH_SIZE};
use model::watermark::Watermark;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Extract into the landing table, then run the transform into the final table
    Run {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        warehouse: WarehouseArgs,

        #[command(flatten)]
        extract: ExtractArgs,

        #[command(flatten)]
        finalize: FinalizeArgs,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Extract into the landing table without running the transform
    Extract {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        warehouse: WarehouseArgs,

        #[command(flatten)]
        extract: ExtractArgs,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Run the transform SQL against the final table
    Finalize {
        #[command(flatten)]
        warehouse: WarehouseArgs,

        #[command(flatten)]
        finalize: FinalizeArgs,
    },
    /// Create the landing table from the field schema document
    CreateTable {
        #[command(flatten)]
        warehouse: WarehouseArgs,

        #[arg(long, help = "Landing table name within the dataset")]
        landing_table: String,

        #[arg(long, help = "Field schema document path within the bucket")]
        schema_file_path: String,
    },
    /// Drop the landing table if it exists
    DropTable {
        #[command(flatten)]
        warehouse: WarehouseArgs,

        #[arg(long, help = "Landing table name within the dataset")]
        landing_table: String,
    },
    /// Resolve the checkpoint and print the extraction query without running it
    Plan {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        warehouse: WarehouseArgs,

        #[command(flatten)]
        extract: ExtractArgs,

        #[arg(long, help = "If set, prints the plan as JSON instead of the bare query")]
        json: bool,
    },
    /// Test that the source database accepts connections
    TestConn {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(long, default_value = "postgres", help = "Source database kind: postgres or mysql")]
    pub source_kind: SourceKind,

    #[arg(long, help = "Read SOURCE_DB_* credentials from this .env file as well")]
    pub env_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct WarehouseArgs {
    #[arg(long, help = "Google Cloud project holding the dataset")]
    pub project_id: String,

    #[arg(long, help = "Dataset of the landing and final tables")]
    pub dataset: String,

    #[arg(long, default_value = "US", help = "Location BigQuery jobs run in")]
    pub location: String,

    #[arg(long, help = "Service-account key file; Application Default Credentials otherwise")]
    pub credentials_file: Option<PathBuf>,

    #[arg(long, help = "Bucket holding the schema and transform documents")]
    pub bucket_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, help = "Source table, optionally schema qualified")]
    pub source_table: String,

    #[arg(long, help = "Landing table name within the dataset")]
    pub landing_table: String,

    #[arg(
        long,
        default_value_t = DEFAULT_FETCH_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_FETCH_SIZE as u64),
        help = "Rows per batch"
    )]
    pub fetch_size: usize,

    #[arg(long, help = "Date-bearing column that orders the extract")]
    pub where_condition_column: Option<String>,

    #[arg(long, help = "Earliest day to extract, DD-Mon-YYYY or YYYY-MM-DD")]
    pub start_condition: Option<Watermark>,

    #[arg(long, help = "Day before which extraction stops, DD-Mon-YYYY or YYYY-MM-DD")]
    pub end_condition: Option<Watermark>,

    #[arg(long, help = "Field schema document path within the bucket")]
    pub schema_file_path: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, help = "Restarts allowed after the first attempt")]
    pub max_retries: u32,

    #[arg(long, default_value_t = 60, help = "Seconds to wait between attempts")]
    pub retry_interval_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct FinalizeArgs {
    #[arg(long, help = "Final table name within the dataset")]
    pub final_table: String,

    #[arg(long, help = "Transform SQL document path within the bucket")]
    pub sql_file_path: String,
}
