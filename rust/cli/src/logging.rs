//! Diagnostic logging for the CLI process.
//!
//! The engine emits `tracing` events; this installs the subscriber that
//! prints them. The filter comes from `PONTOON_LOG` and defaults to `warn`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PONTOON_LOG";

/// Installs a stderr `fmt` subscriber once per process. Later calls, and
/// calls made after another subscriber was installed, are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
