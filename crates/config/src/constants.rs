//! Centralized constants for the coverage export workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed connection timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Default maximum number of retries for idempotent requests.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Upper bound accepted for `max_retries`.
pub const MAX_MAX_RETRIES: usize = 10;

// =============================================================================
// Export Job Tracking Defaults
// =============================================================================

/// Fixed interval between status queries for an active export job.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Smallest poll interval accepted from configuration.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Largest poll interval accepted from configuration.
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// Prefix used when a completed job carries no usable filename.
pub const DEFAULT_DOWNLOAD_STEM: &str = "export";

/// Extension used when a completed job carries no usable filename.
pub const DEFAULT_DOWNLOAD_EXTENSION: &str = "bin";

// =============================================================================
// Environment Variables
// =============================================================================

/// Base URL of the coverage REST API (e.g. `https://coverage.example.com/api`).
pub const ENV_API_URL: &str = "COVERAGE_API_URL";

/// Bearer token sent with every request.
pub const ENV_API_TOKEN: &str = "COVERAGE_API_TOKEN";

/// Skip TLS certificate verification.
pub const ENV_SKIP_VERIFY: &str = "COVERAGE_SKIP_VERIFY";

/// Request timeout in seconds.
pub const ENV_TIMEOUT: &str = "COVERAGE_TIMEOUT";

/// Retry budget for idempotent requests.
pub const ENV_MAX_RETRIES: &str = "COVERAGE_MAX_RETRIES";

/// Export poll interval in milliseconds.
pub const ENV_POLL_INTERVAL_MS: &str = "COVERAGE_POLL_INTERVAL_MS";

/// Directory completed artifacts are saved into.
pub const ENV_DOWNLOAD_DIR: &str = "COVERAGE_DOWNLOAD_DIR";

/// Disables `.env` loading when set to `1` or `true`.
pub const ENV_DOTENV_DISABLED: &str = "DOTENV_DISABLED";
