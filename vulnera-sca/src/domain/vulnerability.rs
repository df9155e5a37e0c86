//! Raw scanner payloads: vulnerabilities and license statuses

use serde::{Deserialize, Serialize};

use super::package::package_alias;

/// Schema dialect of the raw scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanDataFormat {
    /// Container image scan; `status` is `open` or `fixed in ...`
    Twistcli,
    /// Manifest dependency-tree scan; same status shape as image scans
    DependencyTree,
    /// Reported by the remote platform; `status` is an enum and `cveStatus` holds the fix
    Platform,
}

/// One vulnerability entry as reported by an upstream scanner.
///
/// Every field except the package coordinates is optional because upstream
/// scanners routinely omit them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVulnerability {
    pub package_name: String,
    pub package_version: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub cve_id: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cve_status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub cvss: Option<f64>,
    #[serde(default)]
    pub vector: Option<String>,
    #[serde(default)]
    pub risk_factors: Option<serde_json::Value>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub published_days: Option<i64>,
}

impl RawVulnerability {
    pub fn new(
        package_name: impl Into<String>,
        package_version: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            package_version: package_version.into(),
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Upper-cased vulnerability identifier (`id`, falling back to `cveId`)
    pub fn vulnerability_id(&self) -> String {
        self.id
            .as_deref()
            .or(self.cve_id.as_deref())
            .unwrap_or_default()
            .to_uppercase()
    }

    pub fn package_alias(&self) -> String {
        package_alias(&self.package_name, &self.package_version)
    }
}

pub const DEFAULT_LICENSE_POLICY: &str = "BC_LIC1";
pub const DEFAULT_LICENSE_STATUS: &str = "COMPLIANT";

fn default_license_policy() -> String {
    DEFAULT_LICENSE_POLICY.to_string()
}

fn default_license_status() -> String {
    DEFAULT_LICENSE_STATUS.to_string()
}

/// License verdict for one package, as returned by the license-violation service.
///
/// Missing fields are defaulted: an entry without `status` is compliant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseStatus {
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub package_version: String,
    #[serde(default = "default_license_policy")]
    pub policy: String,
    #[serde(default)]
    pub license: String,
    #[serde(default = "default_license_status")]
    pub status: String,
}

impl LicenseStatus {
    /// Platform `OPEN` becomes `FAILED`; anything else passes through
    pub fn normalized_status(&self) -> &str {
        if self.status == "OPEN" {
            "FAILED"
        } else {
            &self.status
        }
    }

    pub fn package_alias(&self) -> String {
        package_alias(&self.package_name, &self.package_version)
    }
}
