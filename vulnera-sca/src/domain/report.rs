//! Report accumulating findings and finding-free packages for one check type

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::finding::{CheckResult, Finding};

/// A scanned package with no findings, kept for bill-of-materials completeness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraResource {
    pub file_abs_path: String,
    pub file_path: String,
    pub resource: String,
    pub details: ExtraResourceDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraResourceDetails {
    pub package_name: String,
    pub package_version: String,
    pub licenses: String,
    pub package_type: String,
}

/// Report shared by several scan units processed in parallel
pub type SharedReport = Arc<tokio::sync::Mutex<Report>>;

/// Append-only report owned by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub check_type: String,
    pub resources: BTreeSet<String>,
    pub records: Vec<Finding>,
    pub extra_resources: Vec<ExtraResource>,
}

impl Report {
    pub fn new(check_type: impl Into<String>) -> Self {
        Self {
            check_type: check_type.into(),
            ..Default::default()
        }
    }

    pub fn add_resource(&mut self, resource: impl Into<String>) {
        self.resources.insert(resource.into());
    }

    pub fn add_record(&mut self, finding: Finding) {
        self.records.push(finding);
    }

    pub fn add_extra_resource(&mut self, extra: ExtraResource) {
        self.extra_resources.push(extra);
    }

    /// Append everything from `other`, keeping its records contiguous
    pub fn extend(&mut self, other: Report) {
        self.resources.extend(other.resources);
        self.records.extend(other.records);
        self.extra_resources.extend(other.extra_resources);
    }

    pub fn passed_checks(&self) -> impl Iterator<Item = &Finding> {
        self.records_with(CheckResult::Passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &Finding> {
        self.records_with(CheckResult::Failed)
    }

    pub fn skipped_checks(&self) -> impl Iterator<Item = &Finding> {
        self.records_with(CheckResult::Skipped)
    }

    fn records_with(&self, result: CheckResult) -> impl Iterator<Item = &Finding> {
        self.records.iter().filter(move |f| f.result() == result)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.extra_resources.is_empty()
    }
}
