#![forbid(unsafe_code)]

//! JSON log output for production hosts.
//!
//! Only compiled with the `tracing-json` feature. Library code never installs
//! a subscriber on its own; the embedding application calls
//! [`init_json_logging`] once at startup.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "scrim=info";

/// Install a global JSON subscriber honoring `RUST_LOG`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_json_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
}
