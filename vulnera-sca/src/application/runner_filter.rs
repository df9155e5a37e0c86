//! Configuration-driven policy filter

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use vulnera_core::application::errors::ApplicationError;
use vulnera_core::config::PolicyConfig;
use vulnera_core::domain::Severity;

use crate::domain::PolicyFilter;

/// Compiled check list entries: id globs plus severity names
#[derive(Debug, Clone, Default)]
struct CheckSelector {
    patterns: Vec<String>,
    ids: GlobSet,
    severities: Vec<Severity>,
}

impl CheckSelector {
    fn compile(entries: &[String]) -> Result<Self, ApplicationError> {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = Vec::new();
        let mut severities = Vec::new();

        for entry in entries.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
            if let Some(severity) = Severity::from_name(entry) {
                severities.push(severity);
                continue;
            }
            let glob = GlobBuilder::new(entry)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    ApplicationError::configuration(format!("Invalid check pattern '{}': {}", entry, e))
                })?;
            builder.add(glob);
            patterns.push(entry.to_string());
        }

        let ids = builder
            .build()
            .map_err(|e| ApplicationError::configuration(format!("Invalid check patterns: {}", e)))?;

        Ok(Self {
            patterns,
            ids,
            severities,
        })
    }

    fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.severities.is_empty()
    }

    fn matches_id(&self, check_id: &str, bc_check_id: &str) -> bool {
        !self.patterns.is_empty() && (self.ids.is_match(check_id) || self.ids.is_match(bc_check_id))
    }
}

/// Policy filter built from [`PolicyConfig`].
///
/// - `checks`: allow-list of check id globs; a severity name selects every
///   finding at or above it.
/// - `skip_checks`: deny-list of check id globs; a severity name skips every
///   finding at or below it.
///
/// An id match in `checks` wins over a severity match in `skip_checks`.
#[derive(Debug, Clone, Default)]
pub struct RunnerFilter {
    checks: CheckSelector,
    skip_checks: CheckSelector,
    severity_threshold: Option<Severity>,
    skip_cve_packages: HashSet<String>,
}

impl RunnerFilter {
    pub fn from_config(config: &PolicyConfig) -> Result<Self, ApplicationError> {
        let severity_threshold = match config.severity_threshold.as_deref() {
            Some(name) => Some(Severity::from_name(name).ok_or_else(|| {
                ApplicationError::configuration(format!("Unknown severity threshold '{}'", name))
            })?),
            None => None,
        };

        Ok(Self {
            checks: CheckSelector::compile(&config.checks)?,
            skip_checks: CheckSelector::compile(&config.skip_checks)?,
            severity_threshold,
            skip_cve_packages: config.skip_cve_packages.iter().cloned().collect(),
        })
    }

    pub fn severity_threshold(&self) -> Option<Severity> {
        self.severity_threshold
    }
}

impl PolicyFilter for RunnerFilter {
    fn should_run_check(
        &self,
        check_id: &str,
        bc_check_id: &str,
        severity: Option<Severity>,
        _report_type: Option<&str>,
    ) -> bool {
        let severity = severity.unwrap_or_default();

        let explicit_id = self.checks.matches_id(check_id, bc_check_id);
        let allowed = self.checks.is_empty()
            || explicit_id
            || self.checks.severities.iter().any(|s| severity >= *s);
        if !allowed {
            return false;
        }

        if self.skip_checks.matches_id(check_id, bc_check_id) {
            return false;
        }
        let skipped_by_severity = self.skip_checks.severities.iter().any(|s| severity <= *s);
        explicit_id || !skipped_by_severity
    }

    /// Only id entries count; severity names in `checks` select, they never exclude
    fn has_explicit_checks(&self) -> bool {
        !self.checks.patterns.is_empty()
    }

    fn within_threshold(&self, severity: Severity) -> bool {
        self.severity_threshold.is_none_or(|threshold| severity >= threshold)
    }

    fn skips_cve_package(&self, package_name: &str) -> bool {
        self.skip_cve_packages.contains(package_name)
    }
}
