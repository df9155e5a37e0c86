//! License aggregation per package alias

use std::collections::HashMap;

use crate::domain::{LicenseStatus, package_alias};

/// Rendering used when a package has no license data
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// `alias -> licenses` in input order, duplicates kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseIndex {
    by_alias: HashMap<String, Vec<String>>,
}

impl LicenseIndex {
    pub fn build(statuses: &[LicenseStatus]) -> Self {
        let mut index = Self::default();
        for status in statuses {
            index.push(status.package_alias(), status.license.clone());
        }
        index
    }

    pub fn push(&mut self, alias: String, license: String) {
        self.by_alias.entry(alias).or_default().push(license);
    }

    pub fn licenses_for(&self, name: &str, version: &str) -> &[String] {
        self.by_alias
            .get(&package_alias(name, version))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rendered license string embedded in CVE findings and extra resources
    pub fn render(&self, name: &str, version: &str) -> String {
        format_licenses(self.licenses_for(name, version))
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

/// `["MIT", "Apache-2.0"]` -> `"MIT", "Apache-2.0"`; empty -> `Unknown`
pub fn format_licenses(licenses: &[String]) -> String {
    if licenses.is_empty() {
        return UNKNOWN_LICENSE.to_string();
    }
    licenses
        .iter()
        .map(|l| format!("\"{}\"", l))
        .collect::<Vec<_>>()
        .join(", ")
}
