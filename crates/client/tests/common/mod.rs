//! Common test utilities for integration tests.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

#[allow(unused_imports)]
pub use coverage_client::testing::load_fixture;

#[allow(unused_imports)]
pub use coverage_client::endpoints;
#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

use coverage_client::{DataType, ExportFilters, ExportFormat, ExportRequest, ExportScope};

/// A repositories/Excel request as the tracker would build it.
#[allow(dead_code)]
pub fn excel_request() -> ExportRequest {
    ExportRequest {
        data_type: DataType::Repositories,
        format: ExportFormat::Excel,
        scope: ExportScope::All,
        filters: ExportFilters::default(),
        filename: "repositories_export_2024-03-01.xlsx".to_string(),
    }
}
