//! `run` command: submit an export, track it and download the artifact.
//!
//! Progress is rendered from store updates until the job leaves polling.
//! Ctrl+C cancels the remote job before the command returns `Cancelled`.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use coverage_client::{
    DataType, ExportFilters, ExportFormat, ExportJob, ExportStatus, MetricsCollector,
};
use coverage_config::Config;
use coverage_export::{DirectorySink, ExportManager};
use tracing::{info, warn};

use super::build_client;
use crate::cancellation::{CancellationToken, Cancelled};
use crate::error::ExportFailed;
use crate::progress::ExportProgress;

pub struct RunRequest {
    pub data_type: DataType,
    pub format: ExportFormat,
    pub filters: ExportFilters,
    pub download: bool,
}

pub async fn run(
    config: Config,
    request: RunRequest,
    quiet: bool,
    cancel: &CancellationToken,
    metrics: Option<MetricsCollector>,
) -> Result<()> {
    let client = build_client(&config, metrics.as_ref())?;
    let mut manager = ExportManager::new(
        Arc::new(client),
        Arc::new(DirectorySink::new(config.export.download_dir.clone())),
    )
    .with_poll_interval(config.export.poll_interval);
    if let Some(metrics) = metrics {
        manager = manager.with_metrics(metrics);
    }

    let option = manager
        .options(request.data_type, &request.filters)
        .into_iter()
        .find(|option| option.format == request.format)
        .ok_or_else(|| anyhow!("No {} export offered for {}", request.format, request.data_type))?;

    let submitted = manager.submit(&option, &request.filters).await?;
    let job_id = submitted.job_id.clone();
    info!(job_id = %job_id, filename = %option.filename, "Tracking export");

    let progress = ExportProgress::new(!quiet, option.filename.clone());
    progress.update(&submitted);

    let job = tokio::select! {
        job = track(&manager, &job_id, &progress) => {
            job.ok_or_else(|| anyhow!("Export job {job_id} is no longer tracked"))?
        }
        _ = cancel.cancelled() => {
            if let Err(e) = manager.cancel(&job_id).await {
                warn!(job_id = %job_id, error = %e, "Could not cancel export after interrupt");
            }
            return Err(Cancelled.into());
        }
    };
    progress.finish(&job);

    match job.status {
        ExportStatus::Completed if request.download => {
            let path = manager.download(&job_id).await?;
            println!("{}", path.display());
            Ok(())
        }
        ExportStatus::Completed => {
            println!("Export job {job_id} completed.");
            Ok(())
        }
        ExportStatus::Failed | ExportStatus::Cancelled => Err(ExportFailed {
            job_id,
            reason: job.failure_reason().map(str::to_string),
            status: job.status,
        }
        .into()),
        status => Err(anyhow!(
            "Lost track of export job {job_id} while it was {status}; check it with `coverage-export status {job_id}`"
        )),
    }
}

/// Follow `job_id` until its poller stops and return the last snapshot.
async fn track(
    manager: &ExportManager,
    job_id: &str,
    progress: &ExportProgress,
) -> Option<ExportJob> {
    let mut revisions = manager.subscribe();
    loop {
        let job = manager.job(job_id)?;
        progress.update(&job);
        if !manager.is_polling(job_id) || revisions.changed().await.is_err() {
            return Some(job);
        }
    }
}
