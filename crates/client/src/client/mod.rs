//! HTTP client for the coverage export API.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//!
//! # What this module does NOT handle:
//! - Request construction and retries (delegated to [`crate::endpoints`])
//! - Job tracking (see the export crate)

pub mod builder;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::api::ExportApi;
use crate::endpoints;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::models::{ExportJob, ExportRequest};

/// Coverage export REST API client.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use coverage_client::ExportClient;
///
/// let client = ExportClient::builder()
///     .base_url("https://coverage.example.com/api".to_string())
///     .build()?;
/// ```
#[derive(Debug)]
pub struct ExportClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_token: Option<SecretString>,
    pub(crate) max_retries: usize,
    pub(crate) metrics: Option<MetricsCollector>,
}

impl ExportClient {
    /// Create a new client builder.
    pub fn builder() -> builder::ExportClientBuilder {
        builder::ExportClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry budget used by [`ExportClient::fetch_status`].
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// One-off status lookup that retries transient failures up to
    /// `max_retries` times.
    ///
    /// Tracking goes through [`ExportApi::get_status`] instead, which makes
    /// a single attempt so a failed poll ends polling.
    pub async fn fetch_status(&self, job_id: &str) -> Result<ExportJob> {
        endpoints::get_export_status(
            &self.http,
            &self.base_url,
            self.api_token.as_ref(),
            job_id,
            self.max_retries,
            self.metrics.as_ref(),
        )
        .await
    }

    pub fn has_api_token(&self) -> bool {
        self.api_token.is_some()
    }

    /// Shared metrics collector, if one was configured.
    pub fn metrics(&self) -> Option<&MetricsCollector> {
        self.metrics.as_ref()
    }
}

// Every tracker call is a single attempt.
#[async_trait]
impl ExportApi for ExportClient {
    async fn create_export(&self, request: &ExportRequest) -> Result<ExportJob> {
        endpoints::create_export(
            &self.http,
            &self.base_url,
            self.api_token.as_ref(),
            request,
            self.metrics.as_ref(),
        )
        .await
    }

    async fn get_status(&self, job_id: &str) -> Result<ExportJob> {
        endpoints::get_export_status(
            &self.http,
            &self.base_url,
            self.api_token.as_ref(),
            job_id,
            0,
            self.metrics.as_ref(),
        )
        .await
    }

    async fn download(&self, job_id: &str) -> Result<Vec<u8>> {
        endpoints::download_export(
            &self.http,
            &self.base_url,
            self.api_token.as_ref(),
            job_id,
            0,
            self.metrics.as_ref(),
        )
        .await
    }

    async fn cancel(&self, job_id: &str) -> Result<()> {
        endpoints::cancel_export(
            &self.http,
            &self.base_url,
            self.api_token.as_ref(),
            job_id,
            self.metrics.as_ref(),
        )
        .await
    }
}
