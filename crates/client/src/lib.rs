//! Coverage export REST API client.
//!
//! This crate provides the wire models for server-side exports, the
//! [`ExportApi`] seam the job tracker talks to, and [`ExportClient`], its
//! HTTP implementation with bearer authentication, retries and metrics.

pub mod api;
pub mod client;
pub mod error;
pub mod metrics;
pub mod metrics_exporter;
pub mod models;
mod serde_helpers;

pub mod endpoints;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use api::ExportApi;
pub use client::ExportClient;
pub use client::builder::ExportClientBuilder;
pub use error::{ClientError, Result};
pub use metrics::{ErrorCategory, MetricsCollector};
pub use models::{
    DataType, ExportFilters, ExportFormat, ExportJob, ExportRequest, ExportScope, ExportStatus,
};
