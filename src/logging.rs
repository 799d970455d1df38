//! Logging initialization: logs go to stderr so stdout carries only the record.
//!
//! `RUST_LOG` takes precedence when set. Otherwise the level is `warn`, or
//! `debug` for this crate when `--verbose` is given.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber
pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let fallback = if verbose {
        "warn,ifsc_ledger=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}
