//! Tracing subscriber bootstrap
//!
//! Logs go to stderr so they never interleave with the conversation on stdout.

use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryAppConfig;

/// Errors from telemetry setup
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Resolve the log filter directive
///
/// Without `-v` the configured level applies; then `info`, `debug`, `trace`.
#[must_use]
pub fn filter_directive(config: &TelemetryAppConfig, verbosity: u8) -> String {
    match verbosity {
        0 => config.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over both the config and the verbosity flag.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &TelemetryAppConfig, verbosity: u8) -> Result<(), TelemetryError> {
    let directive = filter_directive(config, verbosity);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let (plain, json) = if config.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr);
        (None, Some(layer))
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr);
        (Some(layer), None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(plain)
        .with(json)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    debug!(filter = %directive, json = config.json, "Tracing initialized");
    Ok(())
}
