//! Tests for the configuration loader builder.
//!
//! Invariants:
//! - Tests touching the process environment run under `serial_test` and
//!   scope their variables with `temp_env`.

pub mod env_tests;

/// Every variable the loader reads, cleared so ambient values cannot leak in.
pub(super) fn cleared_env() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("COVERAGE_API_URL", None),
        ("COVERAGE_API_TOKEN", None),
        ("COVERAGE_SKIP_VERIFY", None),
        ("COVERAGE_TIMEOUT", None),
        ("COVERAGE_MAX_RETRIES", None),
        ("COVERAGE_POLL_INTERVAL_MS", None),
        ("COVERAGE_DOWNLOAD_DIR", None),
    ]
}

/// `cleared_env()` with the given overrides applied.
pub(super) fn env_with(
    overrides: &[(&'static str, &'static str)],
) -> Vec<(&'static str, Option<&'static str>)> {
    let mut vars = cleared_env();
    for (key, value) in overrides {
        if let Some(slot) = vars.iter_mut().find(|(k, _)| k == key) {
            slot.1 = Some(*value);
        }
    }
    vars
}
