//! Vulnera Core - Foundation crate for the Vulnera SCA engine
//!
//! This crate provides shared functionality used by the correlation engine:
//!
//! # Modules
//!
//! - [`config`] - Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] - Shared value objects (`Version`, `Severity`)
//! - [`application`] - Shared error types
//! - [`logging`] - Structured logging with tracing
//!
//! # Configuration
//!
//! Load configuration from files and environment:
//!
//! ```rust,ignore
//! use vulnera_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `VULNERA__` prefix with double underscore separators:
//!
//! ```bash
//! VULNERA__PLATFORM__API_URL=https://www.bridgecrew.cloud
//! VULNERA__POLICY__SEVERITY_THRESHOLD=medium
//! ```
//!
//! # Logging
//!
//! Initialize structured logging:
//!
//! ```rust,ignore
//! use vulnera_core::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
