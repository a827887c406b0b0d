//! Shared helpers for export tracker tests.
//!
//! Tests run on tokio's paused clock: `sleep` advances virtual time once
//! every task is idle, so a 2100 ms sleep lets exactly one 2000 ms poll tick
//! fire and its (instant) scripted response be applied.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use coverage_client::testing::ScriptedExportApi;
use coverage_client::{DataType, ExportFilters, ExportFormat};
use coverage_export::{ArtifactSink, ExportManager, ExportOption, export_options_at};

pub use coverage_client::testing::{ScriptedFailure, completed_job, failed_job, job};

/// Just past one poll tick.
pub const ONE_TICK: Duration = Duration::from_millis(2100);
/// One full poll interval.
pub const INTERVAL: Duration = Duration::from_millis(2000);

/// Sink that keeps saved artifacts in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingSink {
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactSink for RecordingSink {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> std::io::Result<PathBuf> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes));
        Ok(PathBuf::from("/downloads").join(filename))
    }
}

pub struct Harness {
    pub api: Arc<ScriptedExportApi>,
    pub sink: Arc<RecordingSink>,
    pub manager: ExportManager,
}

/// Manager over a fresh scripted API and recording sink.
pub fn harness() -> Harness {
    let api = Arc::new(ScriptedExportApi::new());
    let sink = Arc::new(RecordingSink::default());
    let manager = ExportManager::new(api.clone(), sink.clone());
    Harness { api, sink, manager }
}

pub fn option(data_type: DataType, format: ExportFormat) -> ExportOption {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    export_options_at(data_type, &ExportFilters::default(), date)
        .into_iter()
        .find(|option| option.format == format)
        .unwrap()
}

pub fn excel_option() -> ExportOption {
    option(DataType::Repositories, ExportFormat::Excel)
}

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
