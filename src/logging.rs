//! Logging setup. Diagnostics go to standard error so that standard output only ever carries
//! reported symbols.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// The filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize logging with the default filter.
///
/// Use the `RUST_LOG` environment variable to override it. Calling this more than once is
/// harmless: only the first subscriber is installed.
pub fn init_logging() {
    init_logging_with(DEFAULT_FILTER);
}

/// Initialize logging, falling back to `default_filter` when `RUST_LOG` is unset or invalid.
pub fn init_logging_with(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
