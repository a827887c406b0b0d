//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Support loading from environment variables and direct builder methods.
//! - Validate and build the final `Config`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over environment variables.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use tracing::debug;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_SECS, ENV_DOTENV_DISABLED,
    MAX_MAX_RETRIES, MAX_POLL_INTERVAL_MS, MAX_TIMEOUT_SECS, MIN_POLL_INTERVAL_MS,
};
use crate::types::{Config, ConnectionConfig, ExportConfig, default_download_dir};

/// Configuration loader that builds config from builder values and environment variables.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    pub(super) base_url: Option<String>,
    pub(super) api_token: Option<SecretString>,
    pub(super) skip_verify: Option<bool>,
    pub(super) timeout: Option<Duration>,
    pub(super) max_retries: Option<usize>,
    pub(super) poll_interval: Option<Duration>,
    pub(super) download_dir: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(ENV_DOTENV_DISABLED).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from `.env` file if present.
    ///
    /// Missing `.env` files are silently ignored. When `DOTENV_DISABLED` is
    /// `true` or `1` the file is not read at all.
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                debug!(path = %path.display(), "Loaded .env file");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Fill unset values from environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    pub fn with_api_token(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    pub fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = Some(skip);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = Some(dir);
        self
    }

    /// Validate the collected values and build the final [`Config`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingBaseUrl`] if no base URL was provided.
    /// - [`ConfigError::InvalidBaseUrl`] if it is not an absolute http(s) URL.
    /// - [`ConfigError::InvalidTimeout`], [`ConfigError::InvalidMaxRetries`],
    ///   [`ConfigError::InvalidPollInterval`] for out-of-range values.
    pub fn build(self) -> Result<Config, ConfigError> {
        let base_url = self.base_url.ok_or(ConfigError::MissingBaseUrl)?;
        let base_url = validate_base_url(&base_url)?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() || timeout.as_secs() > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout {
                message: format!(
                    "must be between 1 and {} seconds (got {})",
                    MAX_TIMEOUT_SECS,
                    timeout.as_secs()
                ),
            });
        }

        let max_retries = self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries > MAX_MAX_RETRIES {
            return Err(ConfigError::InvalidMaxRetries {
                message: format!(
                    "must be between 0 and {} (got {})",
                    MAX_MAX_RETRIES, max_retries
                ),
            });
        }

        let poll_interval = self
            .poll_interval
            .unwrap_or(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
        let poll_ms = poll_interval.as_millis();
        if poll_ms < u128::from(MIN_POLL_INTERVAL_MS) || poll_ms > u128::from(MAX_POLL_INTERVAL_MS)
        {
            return Err(ConfigError::InvalidPollInterval {
                message: format!(
                    "must be between {} and {} ms (got {})",
                    MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, poll_ms
                ),
            });
        }

        Ok(Config {
            connection: ConnectionConfig {
                base_url,
                api_token: self.api_token,
                skip_verify: self.skip_verify.unwrap_or(false),
                timeout,
                max_retries,
            },
            export: ExportConfig {
                poll_interval,
                download_dir: self.download_dir.unwrap_or_else(default_download_dir),
            },
        })
    }
}

/// Check that `raw` is an absolute http(s) URL and strip trailing slashes.
fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{}'", other),
        }),
    }
}
