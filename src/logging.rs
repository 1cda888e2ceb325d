//! Logging setup
//!
//! Library-friendly tracing initialiser. Hosts call [`init`] once at
//! startup; the filter is taken from `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::prelude::*;

/// Initialise the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
