//! Structured logging setup

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install log subscriber: {reason}")]
    InitFailed { reason: String },
}

/// The filter directive implied by the config: `trace` when verbose,
/// `debug` when debugging, else the configured level.
pub fn effective_level(config: &LoggingConfig, debug: bool, verbose: bool) -> &str {
    if verbose {
        "trace"
    } else if debug {
        "debug"
    } else {
        config.level.as_str()
    }
}

/// Build the filter. `RUST_LOG` wins when set.
pub fn build_filter(config: &LoggingConfig, debug: bool, verbose: bool) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = effective_level(config, debug, verbose);
    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter {
        filter: level.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// command output.
pub fn init_logging(config: &LoggingConfig, debug: bool, verbose: bool) -> Result<(), LoggingError> {
    let filter = build_filter(config, debug, verbose)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    result.map_err(|e| LoggingError::InitFailed {
        reason: e.to_string(),
    })
}
