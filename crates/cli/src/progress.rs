//! Progress indicators for the export CLI.
//!
//! Responsibilities:
//! - Render a tracked export's progress (0-100%) and status while it runs.
//! - Ensure ALL progress output is written to STDERR (never stdout).
//! - Allow global suppression via a caller-provided `enabled` boolean (driven by `--quiet`).
//!
//! Non-responsibilities:
//! - This module does not decide *when* progress should be shown; callers do.

use std::time::Duration;

use coverage_client::ExportJob;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// A percent-based progress bar for one export job. No-op when disabled.
pub(crate) struct ExportProgress {
    label: String,
    pb: Option<ProgressBar>,
}

impl ExportProgress {
    /// `enabled` should be `!quiet`.
    pub(crate) fn new(enabled: bool, label: impl Into<String>) -> Self {
        let label = label.into();

        if !enabled {
            return Self { label, pb: None };
        }

        let pb = ProgressBar::new(100);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} {msg} [{bar:40.cyan/blue}] {pos:>3}%")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message(label.clone());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            label,
            pb: Some(pb),
        }
    }

    /// Show the latest snapshot of the job.
    pub(crate) fn update(&self, job: &ExportJob) {
        let Some(pb) = &self.pb else {
            return;
        };

        pb.set_position(u64::from(job.progress_percent()));
        let message = match job.record_counts() {
            Some((processed, total)) => {
                format!("{} {} ({processed}/{total})", self.label, job.status)
            }
            None => format!("{} {}", self.label, job.status),
        };
        pb.set_message(message);
    }

    /// Finish with a stable final line carrying the terminal status.
    pub(crate) fn finish(&self, job: &ExportJob) {
        let Some(pb) = &self.pb else {
            return;
        };

        if job.status == coverage_client::ExportStatus::Completed {
            pb.set_position(100);
        }
        pb.finish_with_message(format!("{} {}", self.label, job.status));
    }
}

impl Drop for ExportProgress {
    fn drop(&mut self) {
        // Clear an unfinished bar so it does not interleave with error output.
        if let Some(pb) = &self.pb
            && !pb.is_finished()
        {
            pb.finish_and_clear();
        }
    }
}

/// An indefinite spinner for short one-shot requests. No-op when disabled.
pub(crate) struct Spinner {
    label: String,
    pb: Option<ProgressBar>,
}

impl Spinner {
    pub(crate) fn new(enabled: bool, label: impl Into<String>) -> Self {
        let label = label.into();

        if !enabled {
            return Self { label, pb: None };
        }

        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(label.clone());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            label,
            pb: Some(pb),
        }
    }

    pub(crate) fn finish(&self) {
        let Some(pb) = &self.pb else {
            return;
        };

        pb.finish_with_message(format!("{} done", self.label));
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(pb) = &self.pb
            && !pb.is_finished()
        {
            pb.finish_and_clear();
        }
    }
}
