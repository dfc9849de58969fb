//! Tracing subscriber setup for the CLI
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary. `RUST_LOG` always wins. Without it the level comes from the
//! command-line flags, and `HOSTCTL_DEBUG=1` acts like `--debug`.

use tracing_subscriber::EnvFilter;

pub const ENV_DEBUG: &str = "HOSTCTL_DEBUG";

/// Check if debug mode was requested through the environment
pub fn is_debug_enabled() -> bool {
    std::env::var(ENV_DEBUG)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Default filter directive for the given flags
pub fn default_directive(verbose: bool, debug: bool) -> &'static str {
    if debug || is_debug_enabled() {
        "hostctl=debug"
    } else if verbose {
        "hostctl=info"
    } else {
        "hostctl=warn"
    }
}

/// Install the global fmt subscriber writing to stderr
///
/// Returns an error if a global subscriber is already set.
pub fn init(verbose: bool, debug: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
