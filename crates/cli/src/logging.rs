//! Tracing subscriber setup for the binary.
//!
//! Logs always go to STDERR so command output on STDOUT stays machine-readable.
//! Filtering follows `RUST_LOG`, defaulting to warnings only.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::args::LogFormat;

const DEFAULT_FILTER: &str = "warn";

pub(crate) fn init(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
