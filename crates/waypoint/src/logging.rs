//! Subscriber setup for hosts that do not install their own.
//!
//! The filter is read from `WAYPOINT_LOG`, then `RUST_LOG`, and defaults to
//! `warn` so only missing-target and configuration problems are shown.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "WAYPOINT_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Build the filter from the environment.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global fmt subscriber.
///
/// Returns `false` if a subscriber was already set; calling twice is safe.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .is_ok()
}
