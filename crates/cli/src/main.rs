//! coverage-export - track server-side coverage data exports from the command line.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Set up logging, metrics and Ctrl+C handling.
//! - Drive the export tracker and map failures to structured exit codes.
//!
//! Does NOT handle:
//! - REST API details (see `crates/client`).
//! - Job tracking semantics (see `crates/export`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` can provide clap env defaults.
//! - Only results go to STDOUT; logs and progress go to STDERR.

mod args;
mod cancellation;
mod commands;
mod dispatch;
mod error;
mod logging;
mod progress;

use std::time::Duration;

use args::Cli;
use cancellation::{CancellationToken, is_cancelled_error, print_cancelled_message};
use clap::Parser;
use coverage_client::MetricsCollector;
use coverage_client::metrics_exporter::MetricsExporter;
use coverage_config::{Config, ConfigError, ConfigLoader};
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use secrecy::SecretString;

#[tokio::main]
async fn main() {
    let loader = match ConfigLoader::new().load_dotenv() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to load environment: {}", e);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };

    let cli = Cli::parse();
    logging::init(cli.log_format);

    let _metrics_exporter = match cli.metrics_bind.as_deref().map(MetricsExporter::install) {
        Some(Ok(exporter)) => Some(exporter),
        Some(Err(e)) => {
            eprintln!("Failed to start metrics exporter: {}", e);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
        None => None,
    };
    let metrics = cli.metrics_bind.is_some().then(MetricsCollector::new);

    let config = if cli.command.needs_config() {
        match build_config(loader, &cli) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Failed to build configuration: {:#}", e);
                std::process::exit(ExitCode::GeneralError.as_i32());
            }
        }
    } else {
        None
    };

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        cancel_clone.cancel();
    });

    let exit_code = match run_command(cli, config, &cancel, metrics).await {
        Ok(()) => ExitCode::Success,
        Err(e) if is_cancelled_error(&e) => {
            print_cancelled_message();
            ExitCode::Interrupted
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// Layer CLI flags over environment variables and defaults.
fn build_config(loader: ConfigLoader, cli: &Cli) -> Result<Config, ConfigError> {
    // Flags are applied after the environment so they win.
    let mut loader = loader.from_env()?;

    if let Some(url) = &cli.api_url {
        loader = loader.with_base_url(url.clone());
    }
    if let Some(token) = &cli.api_token {
        loader = loader.with_api_token(SecretString::new(token.clone().into()));
    }
    if let Some(secs) = cli.timeout {
        loader = loader.with_timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = cli.max_retries {
        loader = loader.with_max_retries(retries);
    }
    if cli.skip_verify {
        loader = loader.with_skip_verify(true);
    }
    if let Some(ms) = cli.poll_interval_ms {
        loader = loader.with_poll_interval(Duration::from_millis(ms));
    }
    if let Some(dir) = &cli.download_dir {
        loader = loader.with_download_dir(dir.clone());
    }

    loader.build()
}
