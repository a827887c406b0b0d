//! Shared test utilities for coverage-export CLI integration tests.
//!
//! Invariants / Assumptions:
//! - Commands are hermetic: `.env` loading is disabled and host `COVERAGE_*`
//!   variables are cleared.
//! - `COVERAGE_API_TOKEN` is set to "test-token" unless overridden.

#![allow(dead_code)]

use assert_cmd::Command;

pub const TOKEN: &str = "test-token";

/// Returns a hermetic `coverage-export` command.
pub fn cli_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coverage-export");

    cmd.env("DOTENV_DISABLED", "1");
    cmd.env("COVERAGE_API_TOKEN", TOKEN);
    cmd.env_remove("COVERAGE_API_URL")
        .env_remove("COVERAGE_SKIP_VERIFY")
        .env_remove("COVERAGE_TIMEOUT")
        .env_remove("COVERAGE_MAX_RETRIES")
        .env_remove("COVERAGE_POLL_INTERVAL_MS")
        .env_remove("COVERAGE_DOWNLOAD_DIR")
        .env_remove("RUST_LOG");

    cmd
}

/// Hermetic command pointed at `base_url` with a fast poll interval.
pub fn cli_cmd_with_base_url(base_url: &str) -> Command {
    let mut cmd = cli_cmd();
    cmd.env("COVERAGE_API_URL", base_url);
    cmd.env("COVERAGE_POLL_INTERVAL_MS", "100");
    cmd
}

pub fn job_body(job_id: &str, status: &str, progress: u32) -> serde_json::Value {
    serde_json::json!({
        "jobId": job_id,
        "status": status,
        "progress": progress,
    })
}
