//! Value objects shared across the workspace

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Package version following semantic versioning.
///
/// Parsing is lenient about what upstream scanners emit: a leading `v`, and
/// missing minor/patch components (`1`, `1.2`) are accepted and padded with zeros.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(pub semver::Version);

/// Error returned when a version string cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid version '{input}': {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: String,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        let candidate = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if candidate.is_empty() {
            return Err(VersionParseError {
                input: input.to_string(),
                reason: "empty version".to_string(),
            });
        }

        if let Ok(version) = semver::Version::parse(candidate) {
            return Ok(Self(version));
        }

        // Pad "1" / "1.2" up to a full triple, keeping any pre-release/build suffix
        let split_at = candidate.find(['-', '+']).unwrap_or(candidate.len());
        let (core, suffix) = candidate.split_at(split_at);
        let parts: Vec<&str> = core.split('.').collect();
        let numeric = parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
        if parts.len() < 3 && numeric {
            let mut padded = parts.join(".");
            for _ in parts.len()..3 {
                padded.push_str(".0");
            }
            padded.push_str(suffix);
            if let Ok(version) = semver::Version::parse(&padded) {
                return Ok(Self(version));
            }
        }

        Err(VersionParseError {
            input: input.to_string(),
            reason: "not a semantic version".to_string(),
        })
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized finding severity, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Baseline severity name used when upstream data omits one
    pub const DEFAULT_NAME: &'static str = "none";

    /// Resolve a severity by name, case-insensitively, honouring legacy aliases
    pub fn from_name(name: &str) -> Option<Self> {
        match normalize_severity_name(name).as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "none" | "info" | "informational" | "negligible" | "unknown" => Some(Self::None),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case a raw severity string and map the `moderate` alias onto `medium`
pub fn normalize_severity_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if lowered == "moderate" {
        "medium".to_string()
    } else {
        lowered
    }
}
