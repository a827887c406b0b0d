//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the matching command handler.
//! - Hand API-backed commands their validated configuration.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Configuration loading (see `main()`).

use anyhow::{Context, Result};
use coverage_client::{ExportFilters, MetricsCollector};
use coverage_config::Config;

use crate::args::{Cli, Commands};
use crate::cancellation::CancellationToken;
use crate::commands;

pub(crate) async fn run_command(
    cli: Cli,
    config: Option<Config>,
    cancel: &CancellationToken,
    metrics: Option<MetricsCollector>,
) -> Result<()> {
    match cli.command {
        Commands::Options { data_type, filters } => {
            commands::options::run(data_type, &ExportFilters::from(filters));
        }
        Commands::Run {
            data_type,
            format,
            filters,
            no_download,
        } => {
            let request = commands::run::RunRequest {
                data_type,
                format,
                filters: filters.into(),
                download: !no_download,
            };
            commands::run::run(require(config)?, request, cli.quiet, cancel, metrics).await?;
        }
        Commands::Cancel { job_id } => {
            commands::cancel::run(require(config)?, &job_id, cli.quiet, metrics.as_ref()).await?;
        }
        Commands::Status { job_id, json } => {
            commands::status::run(require(config)?, &job_id, json, metrics.as_ref()).await?;
        }
    }
    Ok(())
}

fn require(config: Option<Config>) -> Result<Config> {
    config.context("Internal error: command requires connection settings that were not loaded")
}
