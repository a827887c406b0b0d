//! Configuration types for the coverage export tooling.
//!
//! Responsibilities:
//! - Define connection settings (URL, token, TLS verification, timeouts, retries).
//! - Define export tracking settings (poll interval, download directory).
//! - Provide the combined `Config` structure with sensible defaults.
//!
//! Does NOT handle:
//! - Loading from the environment or `.env` files (see `loader` module).
//! - Actual network connections (see the client crate).
//!
//! Invariants:
//! - Default values come from `crate::constants`, never inline magic numbers.
//! - The API token is only ever held as a `SecretString`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_SECS};

/// Connection configuration for the coverage REST API.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the API, without a trailing slash (e.g. `https://coverage.example.com/api`).
    pub base_url: String,
    /// Optional bearer token.
    pub api_token: Option<SecretString>,
    /// Whether to skip TLS verification (for self-signed certificates).
    pub skip_verify: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry budget for idempotent requests.
    pub max_retries: usize,
}

impl ConnectionConfig {
    /// Connection settings for `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Export job tracking configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Interval between status queries for each active job.
    pub poll_interval: Duration,
    /// Directory completed artifacts are written into.
    pub download_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            download_dir: default_download_dir(),
        }
    }
}

/// The user's download directory, or the working directory when the
/// platform does not report one.
pub fn default_download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Complete configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Configuration for `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            connection: ConnectionConfig::new(base_url),
            export: ExportConfig::default(),
        }
    }

    /// Configuration using bearer token authentication.
    pub fn with_api_token(base_url: impl Into<String>, token: SecretString) -> Self {
        let mut config = Self::new(base_url);
        config.connection.api_token = Some(token);
        config
    }
}
