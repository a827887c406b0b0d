//! Error taxonomy of the export job tracker.
//!
//! User-initiated actions (submit, download, cancel) return their errors to
//! the caller. Background status polling never does: a failed status query is
//! wrapped in [`PollTransportError`], logged, and ends polling for that job.

use coverage_client::{ClientError, ExportStatus};
use thiserror::Error;

/// A submission was rejected or could not reach the API.
///
/// No job is stored when submission fails.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("export submission failed: {0}")]
    Rejected(#[source] ClientError),

    #[error("export manager has been disposed")]
    Disposed,
}

/// A background status query failed. Logged only.
#[derive(Debug, Error)]
#[error("status query for export job {job_id} failed: {source}")]
pub struct PollTransportError {
    pub job_id: String,
    pub source: ClientError,
}

/// An artifact could not be retrieved or saved.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("unknown export job {0}")]
    UnknownJob(String),

    #[error("export job {job_id} is {status}, only completed jobs can be downloaded")]
    NotReady {
        job_id: String,
        status: ExportStatus,
    },

    #[error("failed to download export job {job_id}: {source}")]
    Transport {
        job_id: String,
        source: ClientError,
    },

    #[error("failed to save export artifact {filename}: {source}")]
    Save {
        filename: String,
        source: std::io::Error,
    },

    #[error("export manager has been disposed")]
    Disposed,
}

/// A cancellation request failed. Local job state is left as it was.
#[derive(Debug, Error)]
pub enum CancelError {
    #[error("failed to cancel export job {job_id}: {source}")]
    Transport {
        job_id: String,
        source: ClientError,
    },

    #[error("export manager has been disposed")]
    Disposed,
}
