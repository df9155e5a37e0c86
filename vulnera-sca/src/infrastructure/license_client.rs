//! License-violation client for the policy platform

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use vulnera_core::config::PlatformConfig;

use crate::domain::{DEFAULT_LICENSE_POLICY, DEFAULT_LICENSE_STATUS, LicenseStatus, Package};

const LICENSE_VIOLATIONS_PATH: &str = "/api/v1/vulnerabilities/packages/get-licenses-violations";

/// Result of a license-violation fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseFetchOutcome {
    Fetched(Vec<LicenseStatus>),
    /// The service could not be reached or answered garbage; scan goes on without license data
    Unavailable,
}

impl LicenseFetchOutcome {
    pub fn into_statuses(self) -> Vec<LicenseStatus> {
        match self {
            Self::Fetched(statuses) => statuses,
            Self::Unavailable => Vec::new(),
        }
    }
}

/// Source of license verdicts for a package list
#[async_trait]
pub trait LicenseViolationSource: Send + Sync {
    async fn fetch_license_statuses(&self, packages: &[Package]) -> LicenseFetchOutcome;
}

#[derive(Debug, Serialize)]
struct LicenseRequest<'a> {
    packages: Vec<LicenseRequestPackage<'a>>,
}

#[derive(Debug, Serialize)]
struct LicenseRequestPackage<'a> {
    name: &'a str,
    version: &'a str,
    lang: String,
}

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    #[serde(default)]
    violations: Vec<LicenseViolation>,
}

#[derive(Debug, Deserialize)]
struct LicenseViolation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    policy: Option<String>,
    #[serde(default)]
    license: String,
    status: Option<String>,
}

impl From<LicenseViolation> for LicenseStatus {
    fn from(violation: LicenseViolation) -> Self {
        Self {
            package_name: violation.name,
            package_version: violation.version,
            policy: violation
                .policy
                .unwrap_or_else(|| DEFAULT_LICENSE_POLICY.to_string()),
            license: violation.license,
            status: violation
                .status
                .unwrap_or_else(|| DEFAULT_LICENSE_STATUS.to_string()),
        }
    }
}

/// Map scanner package types onto the language names the platform expects
pub fn normalize_language(package_type: &str) -> String {
    let lowered = package_type.trim().to_lowercase();
    match lowered.as_str() {
        "nodejs" | "npm" => "nodejs".to_string(),
        "gem" => "ruby".to_string(),
        "jar" | "java" | "maven" => "maven".to_string(),
        "python" | "pip" => "python".to_string(),
        _ => lowered,
    }
}

/// HTTP client for the platform's license-violation endpoint
pub struct PlatformLicenseClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl PlatformLicenseClient {
    pub fn new(config: &PlatformConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn request(&self, body: &LicenseRequest<'_>) -> Result<Vec<LicenseStatus>, reqwest::Error> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, LICENSE_VIOLATIONS_PATH))
            .json(body);
        if let Some(token) = &self.api_token {
            request = request.header("Authorization", token);
        }

        let response: LicenseResponse = request.send().await?.error_for_status()?.json().await?;
        Ok(response
            .violations
            .into_iter()
            .map(LicenseStatus::from)
            .collect())
    }
}

#[async_trait]
impl LicenseViolationSource for PlatformLicenseClient {
    async fn fetch_license_statuses(&self, packages: &[Package]) -> LicenseFetchOutcome {
        if packages.is_empty() {
            return LicenseFetchOutcome::Fetched(Vec::new());
        }

        let body = LicenseRequest {
            packages: packages
                .iter()
                .map(|p| LicenseRequestPackage {
                    name: &p.name,
                    version: &p.version,
                    lang: normalize_language(&p.package_type),
                })
                .collect(),
        };

        match self.request(&body).await {
            Ok(statuses) => {
                debug!(
                    packages = packages.len(),
                    statuses = statuses.len(),
                    "Fetched license statuses"
                );
                LicenseFetchOutcome::Fetched(statuses)
            }
            Err(e) => {
                info!(
                    error = %e,
                    "Failed to fetch license violations, continuing without license data"
                );
                LicenseFetchOutcome::Unavailable
            }
        }
    }
}
