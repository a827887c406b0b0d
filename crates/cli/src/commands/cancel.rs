//! `cancel` command: one-shot cancellation request.

use anyhow::Result;
use coverage_client::{ExportApi, MetricsCollector};
use coverage_config::Config;
use tracing::info;

use super::build_client;
use crate::progress::Spinner;

pub async fn run(
    config: Config,
    job_id: &str,
    quiet: bool,
    metrics: Option<&MetricsCollector>,
) -> Result<()> {
    let client = build_client(&config, metrics)?;

    let spinner = Spinner::new(!quiet, format!("Cancelling export {job_id}"));
    info!(job_id, "Cancelling export job");
    client.cancel(job_id).await?;
    spinner.finish();

    println!("Export job {job_id} cancelled.");
    Ok(())
}
