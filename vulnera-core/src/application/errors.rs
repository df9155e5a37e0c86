//! Shared application error types

/// Errors raised by application services outside the pure correlation core
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
