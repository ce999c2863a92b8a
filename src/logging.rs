//! Logging setup.
//!
//! Diagnostics always go to stderr so `--json` output on stdout stays clean.
//! `RUST_LOG` overrides the level chosen from `-v`/`-q`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Initialize the global subscriber.
///
/// `verbose` counts `-v` flags (0 = warn, 1 = info, 2 = debug, 3+ = trace);
/// `quiet` drops to errors only. `json` forces JSON-formatted log lines;
/// `None` reads `TD_LOG_JSON`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, json: Option<bool>) -> Result<(), TryInitError> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ticket_desk={level},td={level}")));

    let json = json.unwrap_or_else(|| {
        std::env::var("TD_LOG_JSON").is_ok_and(|value| matches!(value.as_str(), "1" | "true"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2);

    if json {
        builder.json().finish().try_init()
    } else {
        builder.without_time().finish().try_init()
    }
}

/// Install a test-writer subscriber; repeat calls are ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ticket_desk=debug")
        .with_test_writer()
        .try_init();
}
