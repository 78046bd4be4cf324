use crate::{
    error::PipelineError,
    finalize::Finalizer,
    settings::FinalizeSettings,
    supervisor::{ExtractReport, Supervisor},
};
use tracing::info;

/// Extract until the source is drained, then load the final table once.
pub async fn run(
    supervisor: &Supervisor,
    finalizer: &Finalizer,
    finalize: &FinalizeSettings,
) -> Result<ExtractReport, PipelineError> {
    let report = supervisor.run().await?;
    info!(
        attempts = report.attempts,
        rows = report.rows,
        "Extraction finished, running transform"
    );
    finalizer
        .run(&finalize.final_table, &finalize.sql_file_path)
        .await?;
    Ok(report)
}
