//! Canonical finding model shared by CVE and license results

use serde::{Deserialize, Serialize};
use vulnera_core::domain::Severity;

use super::package::ScaDetails;

pub const SCA_PACKAGE_SCAN_CHECK_NAME: &str = "SCA package scan";
pub const SCA_LICENSE_CHECK_NAME: &str = "SCA license";

/// Sentinel for "no known upgrade path"
pub const UNFIXABLE_VERSION: &str = "N/A";

/// Outcome of a check against one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckResult {
    Passed,
    Failed,
    Skipped,
}

/// Result plus the suppression reason when skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub result: CheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_comment: Option<String>,
}

impl CheckOutcome {
    pub fn passed() -> Self {
        Self {
            result: CheckResult::Passed,
            suppress_comment: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            result: CheckResult::Failed,
            suppress_comment: None,
        }
    }

    pub fn skipped(comment: impl Into<String>) -> Self {
        Self {
            result: CheckResult::Skipped,
            suppress_comment: Some(comment.into()),
        }
    }
}

/// Fix information; its shape depends on the scan data format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixDetails {
    /// Image and dependency-tree scans: fix versions parsed out of `status`
    Resolved {
        status: String,
        lowest_fixed_version: String,
        fixed_versions: Vec<String>,
        image_details: Option<ScaDetails>,
    },
    /// Platform scans: the platform already computed the fix
    Platform {
        status: String,
        fix_version: Option<String>,
    },
}

impl FixDetails {
    pub fn status(&self) -> &str {
        match self {
            Self::Resolved { status, .. } | Self::Platform { status, .. } => status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CveDetails {
    pub id: String,
    pub severity: String,
    pub package_name: String,
    pub package_version: String,
    pub package_type: String,
    pub link: Option<String>,
    pub cvss: Option<f64>,
    pub vector: Option<String>,
    pub description: Option<String>,
    pub risk_factors: Option<serde_json::Value>,
    pub published_date: String,
    pub licenses: String,
    pub root_package_name: Option<String>,
    pub root_package_version: Option<String>,
    #[serde(flatten)]
    pub fix: FixDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseDetails {
    pub package_name: String,
    pub package_version: String,
    pub license: String,
    pub status: String,
    pub policy: String,
    pub package_type: String,
}

/// Finding-kind specific evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingDetails {
    Cve(Box<CveDetails>),
    License(LicenseDetails),
}

/// A reportable record: one CVE or one license verdict against one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub check_id: String,
    /// Platform-facing check identifier
    pub bc_check_id: String,
    pub check_name: String,
    pub check_result: CheckOutcome,
    pub code_block: Vec<(u32, String)>,
    pub file_path: String,
    pub file_abs_path: String,
    pub file_line_range: [u32; 2],
    pub resource: String,
    pub check_class: String,
    pub severity: Option<Severity>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub details: FindingDetails,
}

impl Finding {
    pub fn result(&self) -> CheckResult {
        self.check_result.result
    }

    /// Overwrite the result with SKIPPED and record why
    pub fn suppress(&mut self, comment: impl Into<String>) {
        self.check_result = CheckOutcome::skipped(comment);
    }

    pub fn package_name(&self) -> &str {
        match &self.details {
            FindingDetails::Cve(d) => &d.package_name,
            FindingDetails::License(d) => &d.package_name,
        }
    }

    pub fn package_version(&self) -> &str {
        match &self.details {
            FindingDetails::Cve(d) => &d.package_version,
            FindingDetails::License(d) => &d.package_version,
        }
    }

    pub fn cve_details(&self) -> Option<&CveDetails> {
        match &self.details {
            FindingDetails::Cve(d) => Some(d),
            FindingDetails::License(_) => None,
        }
    }

    pub fn license_details(&self) -> Option<&LicenseDetails> {
        match &self.details {
            FindingDetails::License(d) => Some(d),
            FindingDetails::Cve(_) => None,
        }
    }
}

/// `CVE-2021-1234` -> `CKV_CVE_2021_1234`
pub fn cve_check_id(vulnerability_id: &str) -> String {
    format!("CKV_{}", vulnerability_id.replace('-', "_"))
}

/// `CVE-2021-1234` -> `BC_CVE_2021_1234`
pub fn cve_platform_check_id(vulnerability_id: &str) -> String {
    format!("BC_{}", vulnerability_id.replace('-', "_"))
}
