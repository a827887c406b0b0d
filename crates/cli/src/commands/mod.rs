//! Command implementations.

pub mod cancel;
pub mod options;
pub mod run;
pub mod status;

use anyhow::{Context, Result};
use coverage_client::{ExportClient, MetricsCollector};
use coverage_config::Config;

/// HTTP client for `config`, recording request metrics when enabled.
pub(crate) fn build_client(config: &Config, metrics: Option<&MetricsCollector>) -> Result<ExportClient> {
    let mut builder = ExportClient::builder().from_config(config);
    if let Some(metrics) = metrics {
        builder = builder.metrics(metrics.clone());
    }
    builder.build().context("Failed to build export API client")
}
