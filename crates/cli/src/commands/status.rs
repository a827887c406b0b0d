//! `status` command: one-shot status query.

use anyhow::Result;
use coverage_client::{ExportJob, MetricsCollector};
use coverage_config::Config;
use tracing::info;

use super::build_client;

pub async fn run(
    config: Config,
    job_id: &str,
    json: bool,
    metrics: Option<&MetricsCollector>,
) -> Result<()> {
    let client = build_client(&config, metrics)?;

    info!(job_id, "Fetching export status");
    let job = client.fetch_status(job_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        print_job(&job);
    }
    Ok(())
}

fn print_job(job: &ExportJob) {
    println!("Job:      {}", job.job_id);
    println!("Status:   {}", job.status);
    println!("Progress: {}%", job.progress);
    if let Some((processed, total)) = job.record_counts() {
        println!("Records:  {processed}/{total}");
    }
    if let Some(filename) = &job.filename {
        println!("File:     {filename}");
    }
    if let Some(message) = &job.message {
        println!("Message:  {message}");
    }
}
