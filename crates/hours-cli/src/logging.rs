//! Logging setup for the `hours` binary.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr subscriber filtered by `RUST_LOG` (default: `warn`).
///
/// Diagnostics raised while resolving degraded schedule data are `warn!`
/// events, so they show up by default without polluting stdout.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .with_line_number(false)
        .init();
}
