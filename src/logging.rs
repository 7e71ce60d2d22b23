//! Logging setup for the provider.
//!
//! Structured logging via the `tracing` ecosystem, written to **stderr**:
//! when the provider runs as a plugin subprocess, stdout belongs to the
//! host's transport and must stay clean.
//!
//! Filtering follows `RUST_LOG` (e.g. `info`, `samson_provider=debug`),
//! defaulting to `info`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the default logging subscriber.
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

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this does not panic if a subscriber has
/// already been set, which is what tests and embedding hosts want.
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

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so
    // initialization itself is exercised via try_init_logging only.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("samson_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,samson_provider=debug").is_ok());
    }

    #[test]
    fn test_try_init_is_not_fatal_twice() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}
