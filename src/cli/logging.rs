//! Installs the process-wide `tracing` subscriber.

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_VARIABLE: &str = "TALLYMAN_LOG";

const DEFAULT_FILTER: &str = "info";

/// Logs to stderr, filtered by `TALLYMAN_LOG` (default `info`).
///
/// Stdout stays reserved for report output.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_VARIABLE)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ignored = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
