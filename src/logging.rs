//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use std::env;
use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Filter from `RUST_LOG` when set, otherwise from the configured level.
///
/// HTTP client internals are held at `warn` either way.
fn env_filter(level: &str) -> EnvFilter {
    env::var("RUST_LOG")
        .map_or_else(|_| EnvFilter::new(level), |directive| EnvFilter::new(&directive))
        .add_directive(
            "hyper=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            "reqwest=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
        .add_directive(
            "html5ever=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        )
}

/// Install the global subscriber. Logs go to stderr so stdout stays for the run summary.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let registry = tracing_subscriber::registry().with(env_filter(level));

    let result = if config.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .try_init()
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
