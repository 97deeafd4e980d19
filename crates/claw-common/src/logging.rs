//! Stderr diagnostics for the command-line tools.

use tracing_subscriber::{EnvFilter, fmt};

/// Install a stderr subscriber.
///
/// `RUST_LOG` is honoured when no `-v` flag was passed; stdout stays reserved
/// for tool output.
pub fn init(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
