//! tracing subscriber setup for the binaries.
//!
//! Logs go to stderr; stdout is reserved for NDJSON responses.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "YGG_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. Filter comes from `YGG_LOG`, then
/// `RUST_LOG`, then `warn`. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
