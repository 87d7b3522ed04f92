//! Subscriber setup for `tracing` (and `log` records, bridged by the subscriber).

use tracing_subscriber::EnvFilter;

/// Default filter directive for a `-v` count when `RUST_LOG` is unset
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber, writing to stderr so stdout stays clean for reports.
///
/// `RUST_LOG` takes precedence over the verbosity flag. Calling this twice is harmless.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
