//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub platform: PlatformConfig,
    pub policy: PolicyConfig,
    pub sca: ScaConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Remote policy platform configuration (license-violation service)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.bridgecrew.cloud".to_string(),
            api_token: None,
            timeout_seconds: 30,
        }
    }
}

/// Check-selection policy used to build the runner filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Explicit allow-list of check ids (or severity names). Empty means "run everything".
    pub checks: Vec<String>,
    /// Deny-list of check ids (or severity names)
    pub skip_checks: Vec<String>,
    /// Minimum severity a finding needs to be reported as failing
    pub severity_threshold: Option<String>,
    /// Package names whose CVE findings are always skipped
    pub skip_cve_packages: Vec<String>,
}

/// Report assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaConfig {
    pub check_type: String,
    pub check_class: String,
}

impl Default for ScaConfig {
    fn default() -> Self {
        Self {
            check_type: "sca_package".to_string(),
            check_class: "vulnera_sca.runner".to_string(),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.platform.validate()?;
        self.policy.validate()?;
        self.sca.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("VULNERA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("policy.checks")
                    .with_list_parse_key("policy.skip_checks")
                    .with_list_parse_key("policy.skip_cve_packages")
                    .try_parsing(true),
            );

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;
        tracing::debug!(
            api_url = %config.platform.api_url,
            check_type = %config.sca.check_type,
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Parse configuration from a TOML document, applying defaults for missing sections
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
