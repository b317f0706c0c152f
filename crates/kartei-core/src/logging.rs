//! Tracing bootstrap for binaries and tests that embed the codec.
//!
//! The library crates only emit `tracing` events; installing a subscriber is
//! left to whoever owns the process.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{CoreError, CoreResult};

/// Filter used until the configured level has been applied.
const BOOTSTRAP_FILTER: &str = "info";

/// ## Summary
/// Installs a global `tracing` subscriber with a reloadable level filter.
///
/// The configured level is applied after installation; an invalid level keeps
/// the bootstrap filter and is reported as a warning.
///
/// ## Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> CoreResult<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new(BOOTSTRAP_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true).with_line_number(true))
        .try_init()
        .map_err(|e| CoreError::LoggingError(format!("failed to install subscriber: {e}")))?;

    if let Ok(filter) = EnvFilter::try_new(config.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.level, "Invalid log level in config, keeping info");
    }

    Ok(())
}
