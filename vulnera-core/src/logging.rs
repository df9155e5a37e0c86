//! Structured logging bootstrap

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Error returned when the global subscriber cannot be installed
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level` when set. `config.format`
/// selects between `json` (default) and human-readable `pretty` output.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|source| {
            LoggingError::InvalidFilter {
                filter: config.level.clone(),
                source,
            }
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.format.eq_ignore_ascii_case("pretty") {
        builder.pretty().try_init()
    } else {
        builder.json().try_init()
    };

    result.map_err(|e| LoggingError::Install(e.to_string()))
}
