//! Logging setup for providers
//!
//! All logs go to stderr; stdout is reserved for the host handshake.
//! Filtering is controlled through the `RUST_LOG` environment variable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the default logging subscriber.
///
/// Writes to stderr, respects `RUST_LOG`, defaults to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Like [`init_logging`] but does not panic when a subscriber is already
/// set. Returns whether this call installed the subscriber.
pub fn try_init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}
