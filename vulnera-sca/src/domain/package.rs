//! Scanned packages and the identifiers derived from them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A package from a scan's package list.
///
/// Its position in that list is its only stable identity inside a dependency
/// graph: the same `name@version` alias may be declared at several indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub package_type: String,
    /// Set on packages directly declared by the scanned manifest
    #[serde(default)]
    pub root: bool,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            package_type: String::new(),
            root: false,
        }
    }

    pub fn with_type(mut self, package_type: impl Into<String>) -> Self {
        self.package_type = package_type.into();
        self
    }

    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn alias(&self) -> String {
        package_alias(&self.name, &self.version)
    }
}

/// Extra scanner context for a scan unit (e.g. image scan metadata)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaDetails {
    /// Package type keyed by package alias
    #[serde(default)]
    pub package_types: HashMap<String, String>,
}

impl ScaDetails {
    pub fn package_type(&self, alias: &str) -> Option<&str> {
        self.package_types.get(alias).map(String::as_str)
    }
}

/// `name@version`
pub fn package_alias(name: &str, version: &str) -> String {
    format!("{}@{}", name, version)
}

/// Resolve the type of a package, preferring scanner details over the package list entry
pub fn resolve_package_type(
    name: &str,
    version: &str,
    sca_details: Option<&ScaDetails>,
    fallback: Option<&str>,
) -> String {
    let alias = package_alias(name, version);
    sca_details
        .and_then(|details| details.package_type(&alias))
        .or(fallback)
        .unwrap_or_default()
        .to_string()
}

pub fn file_path_for_record(rootless_file_path: &str) -> String {
    if rootless_file_path.starts_with('/') {
        rootless_file_path.to_string()
    } else {
        format!("/{}", rootless_file_path)
    }
}

pub fn resource_for_record(rootless_file_path: &str, package_name: &str) -> String {
    format!("{}.{}", rootless_file_path, package_name)
}
