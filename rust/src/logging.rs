//! Diagnostic tracing for the CLI.
//!
//! Command output (traces, digests, reports) goes to stdout. Diagnostics go to
//! stderr and are controlled by `RUST_LOG`, then by the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LEVEL: &str = "warn";

/// Builds the filter: `RUST_LOG` wins, then `configured`, then `warn`.
/// An unparsable configured directive falls back to `warn`.
pub fn filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Installs the global subscriber. Safe to call once per process; later calls
/// are ignored.
///
/// # Example
/// ```bash
/// RUST_LOG=hashlab_rs=debug hashlab run --preset murmur hunter2
/// ```
pub fn init(configured: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(filter(configured))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
