//! Configuration validation module

use crate::config::{LoggingConfig, PlatformConfig, PolicyConfig, ScaConfig};
use crate::domain::Severity;

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Logging configuration error: {message}")]
    Logging { message: String },

    #[error("Platform configuration error: {message}")]
    Platform { message: String },

    #[error("Policy configuration error: {message}")]
    Policy { message: String },

    #[error("SCA configuration error: {message}")]
    Sca { message: String },
}

impl ValidationError {
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy {
            message: message.into(),
        }
    }

    pub fn sca(message: impl Into<String>) -> Self {
        Self::Sca {
            message: message.into(),
        }
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.level.trim().is_empty() {
            return Err(ValidationError::logging("level cannot be empty"));
        }

        match self.format.to_ascii_lowercase().as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "format must be 'json' or 'pretty', got '{}'",
                other
            ))),
        }
    }
}

impl Validate for PlatformConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.api_url.trim().is_empty() {
            return Err(ValidationError::platform("api_url cannot be empty"));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ValidationError::platform(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ValidationError::platform(
                "timeout_seconds must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for PolicyConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(threshold) = &self.severity_threshold
            && Severity::from_name(threshold).is_none()
        {
            return Err(ValidationError::policy(format!(
                "unknown severity_threshold '{}'",
                threshold
            )));
        }

        if let Some(overlap) = self.checks.iter().find(|c| self.skip_checks.contains(c)) {
            return Err(ValidationError::policy(format!(
                "check '{}' is both allowed and skipped",
                overlap
            )));
        }

        Ok(())
    }
}

impl Validate for ScaConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.check_type.trim().is_empty() {
            return Err(ValidationError::sca("check_type cannot be empty"));
        }
        Ok(())
    }
}
