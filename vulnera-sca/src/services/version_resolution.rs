//! Fix version resolution for image and dependency-tree scan results
//!
//! Upstream scanners report fixes as free text (`"fixed in 1.2.3, 1.3.0"`).
//! This service turns that text into the set of versions that are actual
//! upgrades over the installed version and picks the lowest one.

use tracing::{debug, warn};
use vulnera_core::domain::Version;

use crate::domain::UNFIXABLE_VERSION;

const OPEN_STATUS: &str = "open";
const FIXED_IN_MARKER: &str = "fixed in";

/// Outcome of resolving a vulnerability's fix status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixResolution {
    /// Status as reported, `open` when upstream omitted it
    pub status: String,
    /// Lowest retained fix, or [`UNFIXABLE_VERSION`]
    pub lowest_fixed_version: String,
    /// Retained fixes in input order
    pub fixed_versions: Vec<String>,
}

impl FixResolution {
    fn open(status: String) -> Self {
        Self {
            status,
            lowest_fixed_version: UNFIXABLE_VERSION.to_string(),
            fixed_versions: Vec::new(),
        }
    }

    pub fn has_fix(&self) -> bool {
        !self.fixed_versions.is_empty()
    }
}

/// Resolve the fix versions for a package at `current_version`.
///
/// Only candidates strictly greater than the current version are retained.
/// Candidates that do not parse are dropped. If the current version itself
/// does not parse, every parsable candidate is retained.
pub fn resolve_fixed_versions(current_version: &str, status: Option<&str>) -> FixResolution {
    let status = match status.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => OPEN_STATUS.to_string(),
    };

    if status.eq_ignore_ascii_case(OPEN_STATUS) {
        return FixResolution::open(status);
    }

    let current = match Version::parse(current_version) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(
                version = current_version,
                error = %e,
                "Current package version is not parsable, keeping every fix candidate"
            );
            None
        }
    };

    // Parsed version for ordering, upstream spelling for output
    let mut retained: Vec<(Version, &str)> = Vec::new();
    for candidate in fix_candidates(&status) {
        let parsed = match Version::parse(candidate) {
            Ok(v) => v,
            Err(e) => {
                debug!(candidate, error = %e, "Skipping unparsable fix version");
                continue;
            }
        };

        let is_upgrade = current.as_ref().is_none_or(|c| parsed > *c);
        if is_upgrade && !retained.iter().any(|(v, _)| *v == parsed) {
            retained.push((parsed, candidate));
        }
    }

    let lowest_fixed_version = retained
        .iter()
        .min_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw.to_string())
        .unwrap_or_else(|| UNFIXABLE_VERSION.to_string());
    let fixed_versions = retained.iter().map(|(_, raw)| raw.to_string()).collect();

    FixResolution {
        status,
        lowest_fixed_version,
        fixed_versions,
    }
}

/// Comma separated candidates after the last `fixed in` marker (case-insensitive)
fn fix_candidates(status: &str) -> impl Iterator<Item = &str> {
    let start = status
        .to_ascii_lowercase()
        .rfind(FIXED_IN_MARKER)
        .map(|pos| pos + FIXED_IN_MARKER.len())
        .unwrap_or(0);

    status[start..]
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
}
