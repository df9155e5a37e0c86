//! Policy filter contract
//!
//! The check-selection policy is owned by the caller. The engine only asks it
//! questions and acts on the answer.

use std::collections::HashMap;
use vulnera_core::domain::Severity;

/// What to do with a finding once the policy has been consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Report the finding as built
    Run,
    /// Report the finding, but as SKIPPED with a suppression comment
    SkipWithComment,
    /// Drop the finding entirely
    Exclude,
}

/// Check-selection policy consulted for every finding
pub trait PolicyFilter: Send + Sync {
    fn should_run_check(
        &self,
        check_id: &str,
        bc_check_id: &str,
        severity: Option<Severity>,
        report_type: Option<&str>,
    ) -> bool;

    /// True when the caller configured an explicit allow-list of check ids
    fn has_explicit_checks(&self) -> bool;

    fn within_threshold(&self, severity: Severity) -> bool;

    fn skips_cve_package(&self, package_name: &str) -> bool;

    /// Exclusion is only reachable with an explicit allow-list; otherwise a
    /// check that should not run is still reported, as skipped.
    fn decide(
        &self,
        check_id: &str,
        bc_check_id: &str,
        severity: Option<Severity>,
        report_type: Option<&str>,
    ) -> PolicyDecision {
        if self.should_run_check(check_id, bc_check_id, severity, report_type) {
            PolicyDecision::Run
        } else if self.has_explicit_checks() {
            PolicyDecision::Exclude
        } else {
            PolicyDecision::SkipWithComment
        }
    }
}

/// Lookup of platform policy metadata (license policy severities)
pub trait PolicyMetadata: Send + Sync {
    fn severity_for(&self, policy_id: &str) -> Option<Severity>;
}

/// Policy metadata backed by a fixed map
#[derive(Debug, Clone, Default)]
pub struct StaticPolicyMetadata {
    severities: HashMap<String, Severity>,
}

impl StaticPolicyMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severity(mut self, policy_id: impl Into<String>, severity: Severity) -> Self {
        self.severities.insert(policy_id.into(), severity);
        self
    }
}

impl PolicyMetadata for StaticPolicyMetadata {
    fn severity_for(&self, policy_id: &str) -> Option<Severity> {
        self.severities.get(policy_id).copied()
    }
}
