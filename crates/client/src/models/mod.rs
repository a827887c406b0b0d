//! Data models for the coverage export API.
//!
//! This module contains the request and job snapshot types exchanged with
//! `/exports`. Every type is (de)serialized in the API's camelCase shape.
//!
//! # Submodules
//! - [`request`]: data types, formats, scopes, filters and the request body
//! - [`export`]: job status and job snapshot

pub mod export;
pub mod request;

pub use export::{ExportJob, ExportStatus};
pub use request::{DataType, ExportFilters, ExportFormat, ExportRequest, ExportScope};
