//! Test helper functions for vulnera-sca

use std::collections::HashSet;
use std::sync::Arc;
use vulnera_core::config::PolicyConfig;
use vulnera_sca::{Report, ReportAssembler, RunnerFilter, StaticPolicyMetadata};

pub fn assembler_with(policy: &PolicyConfig) -> ReportAssembler {
    ReportAssembler::new(
        Arc::new(RunnerFilter::from_config(policy).unwrap()),
        Arc::new(StaticPolicyMetadata::new()),
        "vulnera_sca.runner",
    )
    .with_report_type("sca_package")
}

pub fn default_assembler() -> ReportAssembler {
    assembler_with(&PolicyConfig::default())
}

/// Every record has its resource registered, and every package alias lands in
/// exactly one of records / extra resources
pub fn assert_report_invariants(report: &Report) {
    for record in &report.records {
        assert!(
            report.resources.contains(&record.resource),
            "record resource {} missing from resources",
            record.resource
        );
    }

    let recorded: HashSet<(String, String)> = report
        .records
        .iter()
        .filter(|r| r.cve_details().is_some())
        .map(|r| (r.package_name().to_string(), r.package_version().to_string()))
        .collect();
    for extra in &report.extra_resources {
        let key = (
            extra.details.package_name.clone(),
            extra.details.package_version.clone(),
        );
        assert!(
            !recorded.contains(&key),
            "{}@{} is both a record and an extra resource",
            key.0,
            key.1
        );
    }
}

pub fn record_ids(report: &Report) -> Vec<&str> {
    report.records.iter().map(|r| r.check_id.as_str()).collect()
}

pub fn extra_names(report: &Report) -> Vec<&str> {
    report
        .extra_resources
        .iter()
        .map(|e| e.details.package_name.as_str())
        .collect()
}
