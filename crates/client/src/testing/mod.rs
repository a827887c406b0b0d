//! Testing utilities for export client and tracker tests.
//!
//! Available when running tests or when the `test-utils` feature is enabled.
//!
//! # Example
//! ```ignore
//! use coverage_client::testing::{ScriptedExportApi, job, load_fixture};
//!
//! let fixture = load_fixture("exports/status_processing.json");
//!
//! let api = ScriptedExportApi::new();
//! api.on_create(job("job-1", ExportStatus::Pending, 0));
//! api.on_status("job-1", job("job-1", ExportStatus::Completed, 100));
//! ```

mod scripted;

use std::path::Path;

use crate::models::{ExportJob, ExportStatus};

pub use scripted::{ScriptedExportApi, ScriptedFailure};

/// Load a JSON fixture file from the fixtures directory.
///
/// # Panics
/// - If the fixture file cannot be read
/// - If the file content is not valid JSON
pub fn load_fixture(fixture_path: &str) -> serde_json::Value {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let full_path = manifest_dir.join("fixtures").join(fixture_path);
    let content = std::fs::read_to_string(&full_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", full_path.display()));
    serde_json::from_str(&content).expect("Invalid JSON in fixture")
}

/// Snapshot with the given status and progress.
pub fn job(job_id: &str, status: ExportStatus, progress: u32) -> ExportJob {
    ExportJob {
        progress,
        ..ExportJob::new(job_id, status)
    }
}

/// Completed snapshot carrying the artifact name assigned by the API.
pub fn completed_job(job_id: &str, filename: &str) -> ExportJob {
    ExportJob {
        progress: 100,
        filename: Some(filename.to_string()),
        ..ExportJob::new(job_id, ExportStatus::Completed)
    }
}

/// Failed snapshot with a reason.
pub fn failed_job(job_id: &str, message: &str) -> ExportJob {
    ExportJob {
        message: Some(message.to_string()),
        ..ExportJob::new(job_id, ExportStatus::Failed)
    }
}
