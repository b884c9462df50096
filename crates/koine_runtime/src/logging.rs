//! Logging setup.
//!
//! Events go to stderr through `tracing-subscriber`. The filter comes from
//! the `KOINE_LOG` environment variable, falling back to the configured
//! default (`warn` unless overridden).

use koine_foundation::{Error, ErrorKind, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "KOINE_LOG";

/// Builds the filter from `KOINE_LOG`, or from `default` if unset or
/// unparseable.
#[must_use]
pub fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `Internal` if a global subscriber is already installed.
pub fn init(default: &str) -> Result<()> {
    SubscriberBuilder::default()
        .with_env_filter(filter(default))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::new(ErrorKind::Internal(format!("logging already initialized: {e}"))))
}
