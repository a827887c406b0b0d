//! The remote export API as seen by the job tracker.
//!
//! [`ExportApi`] is the seam between the tracker and the network. The
//! production implementation is [`crate::ExportClient`]; tests substitute
//! scripted fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ExportJob, ExportRequest};

/// Operations offered by the export service.
#[async_trait]
pub trait ExportApi: Send + Sync {
    /// Submit a new export job and return its initial snapshot.
    async fn create_export(&self, request: &ExportRequest) -> Result<ExportJob>;

    /// Fetch the latest snapshot of a job.
    async fn get_status(&self, job_id: &str) -> Result<ExportJob>;

    /// Fetch the artifact of a completed job.
    async fn download(&self, job_id: &str) -> Result<Vec<u8>>;

    /// Request cancellation of a job.
    async fn cancel(&self, job_id: &str) -> Result<()>;
}
