//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse environment variables for the coverage export tooling.
//! - Apply environment variable values to a ConfigLoader instance.
//!
//! Does NOT handle:
//! - Building the final Config (see builder.rs).
//! - .env file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric values return ConfigError::InvalidValue.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use super::builder::ConfigLoader;
use super::error::ConfigError;
use crate::constants::{
    ENV_API_TOKEN, ENV_API_URL, ENV_DOWNLOAD_DIR, ENV_MAX_RETRIES, ENV_POLL_INTERVAL_MS,
    ENV_SKIP_VERIFY, ENV_TIMEOUT,
};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_env<T: FromStr>(key: &str, expected: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: key.to_string(),
                message: expected.to_string(),
            })
        })
        .transpose()
}

/// Apply environment variable configuration to the loader.
///
/// Values already set on the loader through builder methods are kept.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if loader.base_url.is_none() {
        loader.base_url = env_var_or_none(ENV_API_URL);
    }
    if loader.api_token.is_none() {
        loader.api_token = env_var_or_none(ENV_API_TOKEN).map(|t| SecretString::new(t.into()));
    }
    if loader.skip_verify.is_none() {
        loader.skip_verify = parse_env(ENV_SKIP_VERIFY, "must be true or false")?;
    }
    if loader.timeout.is_none() {
        loader.timeout =
            parse_env::<u64>(ENV_TIMEOUT, "must be a number")?.map(Duration::from_secs);
    }
    if loader.max_retries.is_none() {
        loader.max_retries = parse_env(ENV_MAX_RETRIES, "must be a non-negative integer")?;
    }
    if loader.poll_interval.is_none() {
        loader.poll_interval = parse_env::<u64>(ENV_POLL_INTERVAL_MS, "must be a number")?
            .map(Duration::from_millis);
    }
    if loader.download_dir.is_none() {
        loader.download_dir = env_var_or_none(ENV_DOWNLOAD_DIR).map(PathBuf::from);
    }
    Ok(())
}
