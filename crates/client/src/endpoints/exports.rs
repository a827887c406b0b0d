//! Export job endpoints.

use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::endpoints::encode_path_segment;
use crate::endpoints::send_request_with_retry;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{ExportJob, ExportRequest};

/// Job snapshots arrive either bare or wrapped in a `data` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JobEnvelope {
    Wrapped { data: ExportJob },
    Bare(ExportJob),
}

impl JobEnvelope {
    fn into_job(self) -> ExportJob {
        match self {
            JobEnvelope::Wrapped { data } => data,
            JobEnvelope::Bare(job) => job,
        }
    }
}

fn authorize(builder: RequestBuilder, api_token: Option<&SecretString>) -> RequestBuilder {
    match api_token {
        Some(token) => builder.bearer_auth(token.expose_secret()),
        None => builder,
    }
}

async fn parse_job(response: Response, what: &str) -> Result<ExportJob> {
    let body = response.text().await?;
    serde_json::from_str::<JobEnvelope>(&body)
        .map(JobEnvelope::into_job)
        .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
}

/// Submit a new export job.
///
/// Sent exactly once. A rejected dispatch is reported to the caller instead
/// of being retried.
pub async fn create_export(
    client: &Client,
    base_url: &str,
    api_token: Option<&SecretString>,
    request: &ExportRequest,
    metrics: Option<&MetricsCollector>,
) -> Result<ExportJob> {
    let url = format!("{}/exports", base_url);
    debug!(
        data_type = request.data_type.wire_tag(),
        format = request.format.as_str(),
        filename = %request.filename,
        "Submitting export job"
    );

    let builder = authorize(client.post(&url), api_token).json(request);
    let response = send_request_with_retry(builder, 0, "/exports", "POST", metrics).await?;

    parse_job(response, "export job").await
}

/// Fetch the latest snapshot of a job.
pub async fn get_export_status(
    client: &Client,
    base_url: &str,
    api_token: Option<&SecretString>,
    job_id: &str,
    max_retries: usize,
    metrics: Option<&MetricsCollector>,
) -> Result<ExportJob> {
    let url = format!("{}/exports/{}/status", base_url, encode_path_segment(job_id));

    let builder = authorize(client.get(&url), api_token);
    let response = send_request_with_retry(
        builder,
        max_retries,
        "/exports/{jobId}/status",
        "GET",
        metrics,
    )
    .await?;

    parse_job(response, "export status").await
}

/// Fetch the artifact bytes of a completed job.
pub async fn download_export(
    client: &Client,
    base_url: &str,
    api_token: Option<&SecretString>,
    job_id: &str,
    max_retries: usize,
    metrics: Option<&MetricsCollector>,
) -> Result<Vec<u8>> {
    let url = format!(
        "{}/exports/{}/download",
        base_url,
        encode_path_segment(job_id)
    );

    let builder = authorize(client.get(&url), api_token);
    let response = send_request_with_retry(
        builder,
        max_retries,
        "/exports/{jobId}/download",
        "GET",
        metrics,
    )
    .await?;

    let bytes = response.bytes().await?;
    debug!(job_id, bytes = bytes.len(), "Downloaded export artifact");
    Ok(bytes.to_vec())
}

/// Ask the API to cancel a job. Sent exactly once.
pub async fn cancel_export(
    client: &Client,
    base_url: &str,
    api_token: Option<&SecretString>,
    job_id: &str,
    metrics: Option<&MetricsCollector>,
) -> Result<()> {
    let url = format!("{}/exports/{}/cancel", base_url, encode_path_segment(job_id));

    let builder = authorize(client.post(&url), api_token);
    send_request_with_retry(builder, 0, "/exports/{jobId}/cancel", "POST", metrics).await?;

    Ok(())
}
