//! Structured logging setup
//!
//! Level comes from RUST_LOG when set, otherwise from `[logging] level` in
//! the config file. Logs are written to stderr so stdout only carries the
//! rendered bill.

use crate::infra::config::Config;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Build the filter: RUST_LOG first, then the configured level, then `info`
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Call once, at startup.
pub fn init(config: &Config) {
    let filter = env_filter(config);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.log_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}
