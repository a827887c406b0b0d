//! Export job status models.
//!
//! # What this module handles:
//! - The export job lifecycle states and their terminal/active split
//! - The job snapshot returned by the create and status endpoints
//!
//! # Invariants
//! - Snapshots are taken verbatim from the API; progress is never clamped or
//!   reordered here, only when formatted for display.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl ExportStatus {
    /// `completed`, `failed` and `cancelled` accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ExportStatus::Completed | ExportStatus::Failed | ExportStatus::Cancelled
        )
    }

    /// `pending` and `processing` are still being worked on remotely.
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ExportStatus::Pending => "pending",
            ExportStatus::Processing => "processing",
            ExportStatus::Completed => "completed",
            ExportStatus::Failed => "failed",
            ExportStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known snapshot of a server-side export job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    /// Opaque identifier assigned by the API.
    pub job_id: String,
    pub status: ExportStatus,
    /// Percentage reported by the API.
    #[serde(
        default,
        deserialize_with = "crate::serde_helpers::u32_from_string_or_number"
    )]
    pub progress: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::serde_helpers::opt_u64_from_string_or_number"
    )]
    pub total_records: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::serde_helpers::opt_u64_from_string_or_number"
    )]
    pub processed_records: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Name assigned to the artifact by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ExportJob {
    /// A bare snapshot with no progress information.
    pub fn new(job_id: impl Into<String>, status: ExportStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            progress: 0,
            total_records: None,
            processed_records: None,
            message: None,
            filename: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Progress clamped to 0–100 for progress bars.
    pub fn progress_percent(&self) -> u8 {
        self.progress.min(100) as u8
    }

    /// Reason shown to the user when the job failed remotely.
    pub fn failure_reason(&self) -> Option<&str> {
        match self.status {
            ExportStatus::Failed => self.message.as_deref(),
            _ => None,
        }
    }

    /// `processed/total` once both counters are known.
    pub fn record_counts(&self) -> Option<(u64, u64)> {
        self.processed_records.zip(self.total_records)
    }
}
