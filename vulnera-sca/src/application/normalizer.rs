//! Finding normalizer
//!
//! Folds the three raw scan dialects into the canonical [`Finding`] shape.
//! Building a finding only reads the policy filter; it never touches a report.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;
use vulnera_core::domain::{Severity, normalize_severity_name};

use crate::domain::finding::{cve_check_id, cve_platform_check_id};
use crate::domain::package::{file_path_for_record, resource_for_record, resolve_package_type};
use crate::domain::{
    CheckOutcome, CveDetails, Finding, FindingDetails, FixDetails, LicenseDetails, LicenseStatus,
    Package, PolicyFilter, RawVulnerability, SCA_LICENSE_CHECK_NAME, SCA_PACKAGE_SCAN_CHECK_NAME,
    ScaDetails, ScanDataFormat,
};
use crate::services::resolve_fixed_versions;

const COMPLIANT_STATUS: &str = "COMPLIANT";

/// Where the findings of one scan unit are reported
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    pub rootless_file_path: &'a str,
    pub file_abs_path: &'a str,
    pub check_class: &'a str,
    pub sca_details: Option<&'a ScaDetails>,
    pub scan_data_format: ScanDataFormat,
}

impl ScanContext<'_> {
    fn file_path(&self) -> String {
        file_path_for_record(self.rootless_file_path)
    }

    fn resource(&self, package_name: &str) -> String {
        resource_for_record(self.rootless_file_path, package_name)
    }

    pub fn package_type(&self, name: &str, version: &str, fallback: Option<&str>) -> String {
        resolve_package_type(name, version, self.sca_details, fallback)
    }
}

/// Package-level data attached to a CVE finding
#[derive(Debug, Clone, Default)]
pub struct PackageContext<'a> {
    /// `type` from the package list, used when scanner details have none
    pub package_type: Option<&'a str>,
    /// Rendered license string of the vulnerable package
    pub licenses: String,
    /// Root package that pulled the vulnerable package in
    pub root: Option<&'a Package>,
}

/// Builds canonical findings from raw scanner entries.
///
/// The wall clock is read per finding unless pinned with [`FindingNormalizer::at`].
#[derive(Debug, Clone, Default)]
pub struct FindingNormalizer {
    pinned_now: Option<DateTime<Utc>>,
}

impl FindingNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer with a fixed clock for `publishedDays` fallbacks
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            pinned_now: Some(now),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.pinned_now.unwrap_or_else(Utc::now)
    }

    pub fn build_cve_finding(
        &self,
        ctx: &ScanContext<'_>,
        vulnerability: &RawVulnerability,
        package: &PackageContext<'_>,
        filter: &dyn PolicyFilter,
    ) -> Finding {
        let package_name = vulnerability.package_name.as_str();
        let package_version = vulnerability.package_version.as_str();
        let cve_id = vulnerability.vulnerability_id();

        let severity_name = normalize_severity_name(
            vulnerability
                .severity
                .as_deref()
                .unwrap_or(Severity::DEFAULT_NAME),
        );
        let severity = Severity::from_name(&severity_name).unwrap_or_else(|| {
            debug!(severity = %severity_name, cve = %cve_id, "Unknown severity, using baseline");
            Severity::default()
        });

        let check_result = if filter.skips_cve_package(package_name) {
            CheckOutcome::skipped(format!("Filtered by package '{}'", package_name))
        } else if !filter.within_threshold(severity) {
            CheckOutcome::skipped("Filtered by severity")
        } else {
            CheckOutcome::failed()
        };

        let details = CveDetails {
            id: cve_id.clone(),
            severity: severity_name,
            package_name: package_name.to_string(),
            package_version: package_version.to_string(),
            package_type: ctx.package_type(package_name, package_version, package.package_type),
            link: vulnerability.link.clone(),
            cvss: vulnerability.cvss,
            vector: vulnerability.vector.clone(),
            description: vulnerability.description.clone(),
            risk_factors: vulnerability.risk_factors.clone(),
            published_date: self.published_date(vulnerability),
            licenses: package.licenses.clone(),
            root_package_name: package.root.map(|r| r.name.clone()),
            root_package_version: package.root.map(|r| r.version.clone()),
            fix: fix_details(ctx, vulnerability),
        };

        Finding {
            check_id: cve_check_id(&cve_id),
            bc_check_id: cve_platform_check_id(&cve_id),
            check_name: SCA_PACKAGE_SCAN_CHECK_NAME.to_string(),
            check_result,
            code_block: vec![(0, format!("{}: {}", package_name, package_version))],
            file_path: ctx.file_path(),
            file_abs_path: ctx.file_abs_path.to_string(),
            file_line_range: [0, 0],
            resource: ctx.resource(package_name),
            check_class: ctx.check_class.to_string(),
            severity: Some(severity),
            description: vulnerability.description.clone(),
            short_description: Some(format!(
                "{} - {}: {}",
                cve_id, package_name, package_version
            )),
            details: FindingDetails::Cve(Box::new(details)),
        }
    }

    pub fn build_license_finding(
        &self,
        ctx: &ScanContext<'_>,
        status: &LicenseStatus,
        package_type: Option<&str>,
        severity: Option<Severity>,
    ) -> Finding {
        let normalized = status.normalized_status();
        let check_result = if normalized == COMPLIANT_STATUS {
            CheckOutcome::passed()
        } else {
            CheckOutcome::failed()
        };

        let details = LicenseDetails {
            package_name: status.package_name.clone(),
            package_version: status.package_version.clone(),
            license: status.license.clone(),
            status: normalized.to_string(),
            policy: status.policy.clone(),
            package_type: ctx.package_type(&status.package_name, &status.package_version, package_type),
        };

        Finding {
            check_id: status.policy.clone(),
            bc_check_id: status.policy.clone(),
            check_name: SCA_LICENSE_CHECK_NAME.to_string(),
            check_result,
            code_block: vec![(
                0,
                format!("{}: {}", status.package_name, status.package_version),
            )],
            file_path: ctx.file_path(),
            file_abs_path: ctx.file_abs_path.to_string(),
            file_line_range: [0, 0],
            resource: ctx.resource(&status.package_name),
            check_class: ctx.check_class.to_string(),
            severity,
            description: None,
            short_description: None,
            details: FindingDetails::License(details),
        }
    }

    /// Explicit date when present, otherwise `now - publishedDays`
    fn published_date(&self, vulnerability: &RawVulnerability) -> String {
        if let Some(date) = vulnerability.published_date.as_deref()
            && !date.is_empty()
        {
            return date.to_string();
        }

        let now = self.now();
        let days = vulnerability.published_days.unwrap_or(0);
        TimeDelta::try_days(days)
            .and_then(|delta| now.checked_sub_signed(delta))
            .unwrap_or(now)
            .to_rfc3339()
    }
}

fn fix_details(ctx: &ScanContext<'_>, vulnerability: &RawVulnerability) -> FixDetails {
    match ctx.scan_data_format {
        ScanDataFormat::Twistcli | ScanDataFormat::DependencyTree => {
            let resolution = resolve_fixed_versions(
                &vulnerability.package_version,
                vulnerability.status.as_deref(),
            );
            FixDetails::Resolved {
                status: resolution.status,
                lowest_fixed_version: resolution.lowest_fixed_version,
                fixed_versions: resolution.fixed_versions,
                image_details: ctx.sca_details.cloned(),
            }
        }
        ScanDataFormat::Platform => FixDetails::Platform {
            status: vulnerability
                .status
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "open".to_string()),
            fix_version: vulnerability.cve_status.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CheckResult, UNFIXABLE_VERSION};
    use chrono::TimeZone;

    struct TestFilter {
        threshold: Severity,
        skip_package: Option<&'static str>,
    }

    impl PolicyFilter for TestFilter {
        fn should_run_check(&self, _: &str, _: &str, _: Option<Severity>, _: Option<&str>) -> bool {
            true
        }

        fn has_explicit_checks(&self) -> bool {
            false
        }

        fn within_threshold(&self, severity: Severity) -> bool {
            severity >= self.threshold
        }

        fn skips_cve_package(&self, package_name: &str) -> bool {
            self.skip_package == Some(package_name)
        }
    }

    fn open_filter() -> TestFilter {
        TestFilter {
            threshold: Severity::None,
            skip_package: None,
        }
    }

    fn ctx(format: ScanDataFormat) -> ScanContext<'static> {
        ScanContext {
            rootless_file_path: "app/requirements.txt",
            file_abs_path: "/repo/app/requirements.txt",
            check_class: "vulnera_sca.runner",
            sca_details: None,
            scan_data_format: format,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_cve_finding_shape() {
        let vuln = RawVulnerability::new("django", "1.2", "cve-2019-19844")
            .with_severity("Critical")
            .with_status("fixed in 1.2.1, 0.9");
        let package = PackageContext {
            package_type: Some("python"),
            licenses: "\"BSD\"".to_string(),
            root: None,
        };

        let finding = FindingNormalizer::at(fixed_now()).build_cve_finding(
            &ctx(ScanDataFormat::Twistcli),
            &vuln,
            &package,
            &open_filter(),
        );

        assert_eq!(finding.check_id, "CKV_CVE_2019_19844");
        assert_eq!(finding.bc_check_id, "BC_CVE_2019_19844");
        assert_eq!(finding.check_name, SCA_PACKAGE_SCAN_CHECK_NAME);
        assert_eq!(finding.result(), CheckResult::Failed);
        assert_eq!(finding.file_path, "/app/requirements.txt");
        assert_eq!(finding.resource, "app/requirements.txt.django");
        assert_eq!(finding.code_block, vec![(0, "django: 1.2".to_string())]);
        assert_eq!(
            finding.short_description.as_deref(),
            Some("CVE-2019-19844 - django: 1.2")
        );
        assert_eq!(finding.severity, Some(Severity::Critical));

        let details = finding.cve_details().unwrap();
        assert_eq!(details.severity, "critical");
        assert_eq!(details.package_type, "python");
        assert_eq!(details.licenses, "\"BSD\"");
        assert_eq!(details.published_date, fixed_now().to_rfc3339());
        match &details.fix {
            FixDetails::Resolved {
                lowest_fixed_version,
                fixed_versions,
                ..
            } => {
                assert_eq!(lowest_fixed_version, "1.2.1");
                assert_eq!(fixed_versions, &vec!["1.2.1".to_string()]);
            }
            other => panic!("unexpected fix details: {:?}", other),
        }
    }

    #[test]
    fn test_moderate_is_medium_before_threshold() {
        let vuln = RawVulnerability::new("pkg", "1.0.0", "CVE-1").with_severity("moderate");
        let filter = TestFilter {
            threshold: Severity::Medium,
            skip_package: None,
        };
        let finding = FindingNormalizer::new().build_cve_finding(
            &ctx(ScanDataFormat::Twistcli),
            &vuln,
            &PackageContext::default(),
            &filter,
        );
        assert_eq!(finding.severity, Some(Severity::Medium));
        assert_eq!(finding.cve_details().unwrap().severity, "medium");
        assert_eq!(finding.result(), CheckResult::Failed);
    }

    #[test]
    fn test_pre_policy_skip_reasons() {
        let vuln = RawVulnerability::new("lodash", "4.0.0", "CVE-2").with_severity("low");
        let normalizer = FindingNormalizer::new();

        let by_package = TestFilter {
            threshold: Severity::Critical,
            skip_package: Some("lodash"),
        };
        let finding = normalizer.build_cve_finding(
            &ctx(ScanDataFormat::Twistcli),
            &vuln,
            &PackageContext::default(),
            &by_package,
        );
        assert_eq!(finding.result(), CheckResult::Skipped);
        assert_eq!(
            finding.check_result.suppress_comment.as_deref(),
            Some("Filtered by package 'lodash'")
        );

        let by_severity = TestFilter {
            threshold: Severity::High,
            skip_package: None,
        };
        let finding = normalizer.build_cve_finding(
            &ctx(ScanDataFormat::Twistcli),
            &vuln,
            &PackageContext::default(),
            &by_severity,
        );
        assert_eq!(
            finding.check_result.suppress_comment.as_deref(),
            Some("Filtered by severity")
        );
    }

    #[test]
    fn test_missing_severity_and_unknown_severity_use_baseline() {
        let normalizer = FindingNormalizer::new();
        for vuln in [
            RawVulnerability::new("pkg", "1.0.0", "CVE-3"),
            RawVulnerability::new("pkg", "1.0.0", "CVE-3").with_severity("urgent"),
        ] {
            let finding = normalizer.build_cve_finding(
                &ctx(ScanDataFormat::Twistcli),
                &vuln,
                &PackageContext::default(),
                &open_filter(),
            );
            assert_eq!(finding.severity, Some(Severity::None));
        }
    }

    #[test]
    fn test_unpinned_normalizer_reads_clock_per_finding() {
        let normalizer = FindingNormalizer::new();
        let mut vuln = RawVulnerability::new("pkg", "1.0.0", "CVE-5");
        vuln.published_days = Some(1);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let before = Utc::now() - TimeDelta::days(1);
        let finding = normalizer.build_cve_finding(
            &ctx(ScanDataFormat::Twistcli),
            &vuln,
            &PackageContext::default(),
            &open_filter(),
        );

        let stamped = DateTime::parse_from_rfc3339(&finding.cve_details().unwrap().published_date)
            .unwrap()
            .with_timezone(&Utc);
        assert!(stamped >= before);
    }

    #[test]
    fn test_published_days_fallback() {
        let mut vuln = RawVulnerability::new("pkg", "1.0.0", "CVE-4");
        vuln.published_days = Some(10);
        let finding = FindingNormalizer::at(fixed_now()).build_cve_finding(
            &ctx(ScanDataFormat::Twistcli),
            &vuln,
            &PackageContext::default(),
            &open_filter(),
        );
        let expected = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(
            finding.cve_details().unwrap().published_date,
            expected.to_rfc3339()
        );

        vuln.published_date = Some("2020-01-01T00:00:00Z".to_string());
        let finding = FindingNormalizer::at(fixed_now()).build_cve_finding(
            &ctx(ScanDataFormat::Twistcli),
            &vuln,
            &PackageContext::default(),
            &open_filter(),
        );
        assert_eq!(
            finding.cve_details().unwrap().published_date,
            "2020-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_platform_format_uses_cve_status() {
        let mut vuln = RawVulnerability::new("pkg", "1.0.0", "CVE-5").with_status("fixable");
        vuln.cve_status = Some("fixed in 1.0.1".to_string());
        let finding = FindingNormalizer::new().build_cve_finding(
            &ctx(ScanDataFormat::Platform),
            &vuln,
            &PackageContext::default(),
            &open_filter(),
        );
        assert_eq!(
            finding.cve_details().unwrap().fix,
            FixDetails::Platform {
                status: "fixable".to_string(),
                fix_version: Some("fixed in 1.0.1".to_string()),
            }
        );
    }

    #[test]
    fn test_open_status_has_sentinel_fix() {
        let vuln = RawVulnerability::new("pkg", "1.0.0", "CVE-6");
        let finding = FindingNormalizer::new().build_cve_finding(
            &ctx(ScanDataFormat::DependencyTree),
            &vuln,
            &PackageContext::default(),
            &open_filter(),
        );
        match &finding.cve_details().unwrap().fix {
            FixDetails::Resolved {
                status,
                lowest_fixed_version,
                ..
            } => {
                assert_eq!(status, "open");
                assert_eq!(lowest_fixed_version, UNFIXABLE_VERSION);
            }
            other => panic!("unexpected fix details: {:?}", other),
        }
    }

    #[test]
    fn test_root_provenance() {
        let root = Package::new("express", "4.17.1").as_root();
        let vuln = RawVulnerability::new("qs", "6.7.0", "CVE-2022-24999");
        let package = PackageContext {
            root: Some(&root),
            ..Default::default()
        };
        let finding = FindingNormalizer::new().build_cve_finding(
            &ctx(ScanDataFormat::DependencyTree),
            &vuln,
            &package,
            &open_filter(),
        );
        let details = finding.cve_details().unwrap();
        assert_eq!(details.root_package_name.as_deref(), Some("express"));
        assert_eq!(details.root_package_version.as_deref(), Some("4.17.1"));
        assert_eq!(finding.resource, "app/requirements.txt.qs");
    }

    #[test]
    fn test_license_finding() {
        let status = LicenseStatus {
            package_name: "django".to_string(),
            package_version: "1.2".to_string(),
            policy: "BC_LIC_1".to_string(),
            license: "DUMMY_LICENSE".to_string(),
            status: "OPEN".to_string(),
        };
        let finding = FindingNormalizer::new().build_license_finding(
            &ctx(ScanDataFormat::Twistcli),
            &status,
            Some("python"),
            None,
        );

        assert_eq!(finding.check_id, "BC_LIC_1");
        assert_eq!(finding.bc_check_id, "BC_LIC_1");
        assert_eq!(finding.check_name, SCA_LICENSE_CHECK_NAME);
        assert_eq!(finding.result(), CheckResult::Failed);
        assert_eq!(finding.code_block, vec![(0, "django: 1.2".to_string())]);
        let details = finding.license_details().unwrap();
        assert_eq!(details.status, "FAILED");
        assert_eq!(details.package_type, "python");

        let compliant = LicenseStatus {
            status: "COMPLIANT".to_string(),
            ..status
        };
        let finding = FindingNormalizer::new().build_license_finding(
            &ctx(ScanDataFormat::Twistcli),
            &compliant,
            None,
            None,
        );
        assert_eq!(finding.result(), CheckResult::Passed);
    }
}
