//! Client builder for constructing [`ExportClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Validating required configuration (base_url)
//! - Normalizing the base URL (removing trailing slashes)
//! - Configuring the underlying HTTP client (timeouts, TLS verification, redirects)
//!
//! # Invariants
//! - `base_url` must be provided before calling `build()`
//! - The base URL is always normalized to have no trailing slashes
//! - `skip_verify` only affects HTTPS connections; HTTP connections log a warning

use std::time::Duration;

use coverage_config::{
    Config,
    constants::{DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS},
};
use secrecy::SecretString;

use crate::client::ExportClient;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Builder for creating a new [`ExportClient`].
///
/// All options have defaults except `base_url`.
///
/// ```rust,ignore
/// use coverage_client::ExportClient;
/// use secrecy::SecretString;
///
/// let client = ExportClient::builder()
///     .base_url("https://coverage.example.com/api".to_string())
///     .api_token(SecretString::new("token".to_string().into()))
///     .timeout(Duration::from_secs(60))
///     .build()?;
/// ```
pub struct ExportClientBuilder {
    base_url: Option<String>,
    api_token: Option<SecretString>,
    skip_verify: bool,
    timeout: Duration,
    max_retries: usize,
    metrics: Option<MetricsCollector>,
}

impl Default for ExportClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            metrics: None,
        }
    }
}

impl ExportClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the export API, e.g. `https://coverage.example.com/api`.
    ///
    /// Trailing slashes are removed.
    pub fn base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn api_token(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    /// Skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this against development servers with self-signed certificates.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Per-request timeout. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry budget for idempotent requests. Default is 3 (1s, 2s, 4s delays).
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Record request latency, counts and errors.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Pre-configure the builder from loaded configuration.
    pub fn from_config(mut self, config: &Config) -> Self {
        self.base_url = Some(config.connection.base_url.clone());
        self.api_token = config.connection.api_token.clone();
        self.skip_verify = config.connection.skip_verify;
        self.timeout = config.connection.timeout;
        self.max_retries = config.connection.max_retries;
        self
    }

    /// - `"https://host/api/"` -> `"https://host/api"`
    /// - `"https://host//"` -> `"https://host"`
    fn normalize_base_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Build the [`ExportClient`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` was not provided or is empty.
    /// Returns [`ClientError::HttpError`] if the HTTP client fails to build.
    pub fn build(self) -> Result<ExportClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::InvalidUrl("base_url is required".to_string()))?;
        let base_url = Self::normalize_base_url(base_url);
        if base_url.is_empty() {
            return Err(ClientError::InvalidUrl("base_url is empty".to_string()));
        }

        let mut http_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS));

        if self.skip_verify {
            if base_url.starts_with("https://") {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                tracing::warn!(
                    "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
                );
            }
        }

        let http = http_builder.build()?;

        Ok(ExportClient {
            http,
            base_url,
            api_token: self.api_token,
            max_retries: self.max_retries,
            metrics: self.metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_with_api_token() {
        let config = Config::with_api_token(
            "https://coverage.example.com/api",
            SecretString::new("test-token".to_string().into()),
        );

        let client = ExportClient::builder().from_config(&config).build().unwrap();

        assert_eq!(client.base_url(), "https://coverage.example.com/api");
        assert!(client.has_api_token());
    }

    #[test]
    fn test_from_config_preserves_settings() {
        let mut config = Config::new("https://coverage.example.com/api");
        config.connection.skip_verify = true;
        config.connection.timeout = Duration::from_secs(120);
        config.connection.max_retries = 7;

        let builder = ExportClient::builder().from_config(&config);

        assert_eq!(
            builder.base_url,
            Some("https://coverage.example.com/api".to_string())
        );
        assert!(builder.skip_verify);
        assert_eq!(builder.timeout, Duration::from_secs(120));
        assert_eq!(builder.max_retries, 7);
        assert!(builder.api_token.is_none());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            ExportClientBuilder::normalize_base_url("https://localhost:8443/".to_string()),
            "https://localhost:8443"
        );
        assert_eq!(
            ExportClientBuilder::normalize_base_url("https://localhost:8443".to_string()),
            "https://localhost:8443"
        );
        assert_eq!(
            ExportClientBuilder::normalize_base_url("https://example.com//".to_string()),
            "https://example.com"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = ExportClient::builder().base_url("/".to_string()).build();
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
