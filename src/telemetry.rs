//! Tracing subscriber setup.

use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

/// Builds the event filter: `RUST_LOG` when set and valid, otherwise the
/// configured level, otherwise `info`.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber.
///
/// Returns `false` when a subscriber was already installed; the existing one
/// is kept.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let output = if config.json {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .json()
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let installed = registry()
        .with(output.with_filter(env_filter(config)))
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
    }
    installed
}
