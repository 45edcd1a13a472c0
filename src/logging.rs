//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events; applications embedding the
//! client call [`init_tracing`] once at startup (or install their own
//! subscriber). `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`], and
//! `LOG_FORMAT=json` switches to JSON lines.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "acelerate_client=info";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Whether `LOG_FORMAT` requests JSON output.
pub fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber.
///
/// # Errors
/// Fails if a global subscriber has already been set.
pub fn try_init_tracing() -> Result<(), InitError> {
    let filter = env_filter();
    if json_requested() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    }
}

/// Install the global subscriber, ignoring an already-installed one.
pub fn init_tracing() {
    if try_init_tracing().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
