//! Request execution with retry and exponential backoff.
//!
//! Idempotent requests that fail with a transient status (429, 502, 503,
//! 504), a connect error or a timeout are retried with 2^attempt second
//! backoff. Every attempt is recorded in the optional [`MetricsCollector`].

use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Header the API uses to correlate requests in its own logs.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Error bodies the API is known to send.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Sends a request, retrying transient failures up to `max_retries` times.
///
/// `max_retries = 0` means a single attempt. Non-idempotent calls pass 0.
///
/// # Errors
///
/// - [`ClientError::NotFound`] for HTTP 404
/// - [`ClientError::ApiError`] for any other non-2xx status
/// - [`ClientError::Timeout`] when the request timed out
/// - [`ClientError::MaxRetriesExceeded`] when every attempt hit a retryable status
/// - [`ClientError::HttpError`] for other transport failures
pub async fn send_request_with_retry(
    builder: RequestBuilder,
    max_retries: usize,
    endpoint: &str,
    method: &str,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    let mut attempt = 0;

    loop {
        let attempt_builder = match builder.try_clone() {
            Some(cloned) => cloned,
            None if attempt == 0 => {
                debug!(endpoint, "Request builder cannot be cloned, single attempt only");
                return execute_once(builder, endpoint, method, metrics).await;
            }
            None => return Err(ClientError::MaxRetriesExceeded(attempt)),
        };

        if attempt > 0
            && let Some(m) = metrics
        {
            m.record_retry(endpoint, method, attempt);
        }

        let result = execute_once(attempt_builder, endpoint, method, metrics).await;

        match result {
            Ok(response) => {
                if attempt > 0 {
                    debug!(endpoint, attempt = attempt + 1, "Request succeeded after retry");
                }
                return Ok(response);
            }
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let backoff_secs = 2u64.pow(attempt as u32);
                warn!(
                    endpoint,
                    attempt = attempt + 1,
                    max_attempts = max_retries + 1,
                    backoff_secs,
                    error = %e,
                    "Transient failure, retrying with exponential backoff"
                );
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                attempt += 1;
            }
            Err(e) if e.is_retryable() && max_retries > 0 => {
                debug!(endpoint, attempts = attempt + 1, "Retries exhausted");
                if let ClientError::ApiError { .. } = e {
                    return Err(ClientError::MaxRetriesExceeded(attempt + 1));
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sends one attempt and maps the outcome onto [`ClientError`].
async fn execute_once(
    builder: RequestBuilder,
    endpoint: &str,
    method: &str,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    if let Some(m) = metrics {
        m.record_request(endpoint, method);
    }

    let started = Instant::now();
    let sent = builder.send().await;
    let elapsed = started.elapsed();

    let response = match sent {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                ClientError::Timeout(format!("{} {}", method, endpoint))
            } else {
                ClientError::from(e)
            };
            if let Some(m) = metrics {
                m.record_request_duration(endpoint, method, elapsed, None);
                m.record_client_error(endpoint, method, &error);
            }
            return Err(error);
        }
    };

    let status = response.status().as_u16();
    if let Some(m) = metrics {
        m.record_request_duration(endpoint, method, elapsed, Some(status));
    }

    if response.status().is_success() {
        return Ok(response);
    }

    let error = error_from_response(response).await;
    if let Some(m) = metrics {
        m.record_client_error(endpoint, method, &error);
    }
    Err(error)
}

/// Builds the error for a non-2xx response, preferring the API's own message.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or(body);

    if status == 404 {
        return ClientError::NotFound(format!("{}: {}", url, message));
    }

    ClientError::ApiError {
        status,
        url,
        message,
        request_id,
    }
}
