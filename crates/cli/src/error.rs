//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `ClientError` variants and export outcomes to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - Signal handling (see cancellation.rs).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use coverage_client::{ClientError, ExportStatus};
use thiserror::Error;

/// Structured exit codes for `coverage-export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,

    /// Unhandled or generic failure, including configuration errors.
    GeneralError = 1,

    /// Network, timeout, DNS failure, or retries exhausted.
    ///
    /// Scripts may retry with exponential backoff.
    ConnectionError = 3,

    /// The export job or its artifact does not exist.
    NotFound = 4,

    /// The API rejected the request or sent something unreadable.
    ///
    /// Scripts should fix the input and not retry the same request.
    ValidationError = 5,

    /// The export job finished as failed or cancelled.
    ExportFailed = 6,

    /// SIGINT/Ctrl+C (128 + 2).
    Interrupted = 130,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Timeout(_) | ClientError::InvalidUrl(_) => ExitCode::ConnectionError,
            ClientError::MaxRetriesExceeded(_) => ExitCode::ConnectionError,
            ClientError::HttpError(e) if e.is_connect() || e.is_timeout() => {
                ExitCode::ConnectionError
            }
            ClientError::HttpError(_) => ExitCode::GeneralError,

            ClientError::NotFound(_) | ClientError::ApiError { status: 404, .. } => {
                ExitCode::NotFound
            }

            ClientError::InvalidResponse(_) => ExitCode::ValidationError,
            ClientError::ApiError {
                status: 400 | 409 | 422,
                ..
            } => ExitCode::ValidationError,

            ClientError::ApiError { status, .. } if ClientError::is_retryable_status(*status) => {
                ExitCode::ConnectionError
            }
            ClientError::ApiError { .. } => ExitCode::GeneralError,
        }
    }
}

/// A tracked export reached a terminal state other than `completed`.
#[derive(Debug, Error)]
#[error("Export job {job_id} {status}{}", .reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
pub struct ExportFailed {
    pub job_id: String,
    pub status: ExportStatus,
    pub reason: Option<String>,
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Exit code for this error; `GeneralError` when nothing more specific applies.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if cause.downcast_ref::<ExportFailed>().is_some() {
                return ExitCode::ExportFailed;
            }
            if let Some(client_err) = cause.downcast_ref::<ClientError>() {
                return ExitCode::from(client_err);
            }
        }
        ExitCode::GeneralError
    }
}
