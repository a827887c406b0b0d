//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and their environment fallbacks.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not validate configuration (see `coverage_config::ConfigLoader`).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use coverage_client::{DataType, ExportFilters, ExportFormat};

#[derive(Parser)]
#[command(name = "coverage-export")]
#[command(about = "Run and track server-side coverage data exports", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  coverage-export options teams\n  coverage-export run repositories --format csv\n  coverage-export run methods --team platform --no-download\n  coverage-export status exp_7f3c2a\n  coverage-export cancel exp_7f3c2a\n"
)]
pub struct Cli {
    /// Base URL of the coverage API (e.g., https://coverage.example.com/api)
    #[arg(long, global = true, env = "COVERAGE_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the coverage API
    #[arg(long, global = true, env = "COVERAGE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Maximum number of retries for failed status and download requests
    #[arg(long, global = true)]
    pub max_retries: Option<usize>,

    /// Skip TLS certificate verification (for self-signed certificates)
    #[arg(long, global = true)]
    pub skip_verify: bool,

    /// Interval between status queries while tracking a job
    #[arg(long, global = true, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Directory downloaded artifacts are saved into
    #[arg(long, global = true, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Suppress progress output (spinners / progress bars).
    ///
    /// Progress indicators always write to STDERR; this flag disables them entirely.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log output format (logs go to STDERR, filtered by RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, global = true, value_name = "ADDR")]
    pub metrics_bind: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the exports offered for a data type
    Options {
        /// repositories, teams, methods, classes or analytics
        data_type: DataType,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Submit an export, track it to completion and download the artifact
    Run {
        /// repositories, teams, methods, classes or analytics
        data_type: DataType,

        /// Artifact format: excel, csv or json
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        #[command(flatten)]
        filters: FilterArgs,

        /// Stop once the job completes without downloading the artifact
        #[arg(long)]
        no_download: bool,
    },

    /// Cancel a running export job
    Cancel {
        job_id: String,
    },

    /// Show the current status of an export job
    Status {
        job_id: String,

        /// Print the raw job snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Whether the command talks to the API and so needs a full configuration.
    pub fn needs_config(&self) -> bool {
        !matches!(self, Commands::Options { .. })
    }
}

/// Dashboard filters forwarded with the export request.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Restrict to one team
    #[arg(long, value_name = "NAME")]
    pub team: Option<String>,

    /// Restrict to one repository
    #[arg(long, value_name = "NAME")]
    pub repository: Option<String>,

    /// Restrict to annotated (true) or unannotated (false) entries
    #[arg(long, value_name = "BOOL")]
    pub annotated: Option<bool>,
}

impl From<FilterArgs> for ExportFilters {
    fn from(args: FilterArgs) -> Self {
        ExportFilters {
            team_name: args.team,
            repository_name: args.repository,
            annotated: args.annotated,
        }
    }
}
