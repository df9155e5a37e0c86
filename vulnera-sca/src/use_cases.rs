//! Report assembly use case

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use vulnera_core::Config;
use vulnera_core::application::errors::ApplicationError;

use crate::application::{FindingNormalizer, PackageContext, RunnerFilter, ScanContext};
use crate::domain::package::{file_path_for_record, resource_for_record};
use crate::domain::{
    CheckResult, DependencyGraph, ExtraResource, ExtraResourceDetails, Finding, LicenseStatus,
    Package, PolicyDecision, PolicyFilter, PolicyMetadata, RawDependencyMap, RawVulnerability,
    Report, ScaDetails, ScaError, ScanDataFormat, SharedReport, package_alias,
};
use crate::services::{LicenseIndex, resolve_dependencies};

/// Raw scan results for one scanned manifest or image
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanUnit {
    pub rootless_file_path: String,
    pub file_abs_path: String,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub vulnerabilities: Vec<RawVulnerability>,
    #[serde(default)]
    pub license_statuses: Vec<LicenseStatus>,
    /// Present (even empty) for dependency-tree scans, absent for flat scans
    #[serde(default)]
    pub dependencies: Option<RawDependencyMap>,
    #[serde(default)]
    pub sca_details: Option<ScaDetails>,
    /// Overrides the dialect implied by `dependencies`
    #[serde(default)]
    pub scan_data_format: Option<ScanDataFormat>,
}

impl ScanUnit {
    pub fn new(rootless_file_path: impl Into<String>, file_abs_path: impl Into<String>) -> Self {
        Self {
            rootless_file_path: rootless_file_path.into(),
            file_abs_path: file_abs_path.into(),
            ..Default::default()
        }
    }

    fn data_format(&self) -> ScanDataFormat {
        self.scan_data_format.unwrap_or(if self.dependencies.is_some() {
            ScanDataFormat::DependencyTree
        } else {
            ScanDataFormat::Twistcli
        })
    }
}

/// Counts of what one assembly contributed to a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub records: usize,
    pub skipped: usize,
    pub excluded: usize,
    pub extra_resources: usize,
}

impl AddAssign for AssemblySummary {
    fn add_assign(&mut self, other: Self) {
        self.records += other.records;
        self.skipped += other.skipped;
        self.excluded += other.excluded;
        self.extra_resources += other.extra_resources;
    }
}

/// Populates a caller-owned [`Report`] from raw scan units.
///
/// The report is only appended to. A unit whose dependency data is invalid is
/// rejected before anything is written.
pub struct ReportAssembler {
    filter: Arc<dyn PolicyFilter>,
    metadata: Arc<dyn PolicyMetadata>,
    normalizer: FindingNormalizer,
    check_class: String,
    report_type: Option<String>,
}

impl ReportAssembler {
    pub fn new(
        filter: Arc<dyn PolicyFilter>,
        metadata: Arc<dyn PolicyMetadata>,
        check_class: impl Into<String>,
    ) -> Self {
        Self {
            filter,
            metadata,
            normalizer: FindingNormalizer::new(),
            check_class: check_class.into(),
            report_type: None,
        }
    }

    /// Assembler using a [`RunnerFilter`] built from the policy section
    pub fn from_config(
        config: &Config,
        metadata: Arc<dyn PolicyMetadata>,
    ) -> Result<Self, ApplicationError> {
        let filter = RunnerFilter::from_config(&config.policy)?;
        Ok(Self::new(Arc::new(filter), metadata, config.sca.check_class.clone())
            .with_report_type(config.sca.check_type.clone()))
    }

    pub fn with_report_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = Some(report_type.into());
        self
    }

    pub fn with_normalizer(mut self, normalizer: FindingNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Add all findings and finding-free packages of `unit` to `report`
    pub fn add_to_report(
        &self,
        report: &mut Report,
        unit: &ScanUnit,
    ) -> Result<AssemblySummary, ScaError> {
        let graph = unit
            .dependencies
            .as_ref()
            .map(|raw| DependencyGraph::from_raw(raw, unit.packages.len()))
            .transpose()?;

        let ctx = ScanContext {
            rootless_file_path: &unit.rootless_file_path,
            file_abs_path: &unit.file_abs_path,
            check_class: &self.check_class,
            sca_details: unit.sca_details.as_ref(),
            scan_data_format: unit.data_format(),
        };
        let package_types = package_types(&unit.packages);

        let mut summary = AssemblySummary::default();
        let licenses = self.add_license_findings(report, &ctx, unit, &package_types, &mut summary);

        match &graph {
            Some(graph) => {
                self.add_with_dependencies(report, &ctx, unit, graph, &licenses, &mut summary)?
            }
            None => self.add_flat(report, &ctx, unit, &package_types, &licenses, &mut summary),
        }

        info!(
            file = %unit.rootless_file_path,
            records = summary.records,
            skipped = summary.skipped,
            excluded = summary.excluded,
            extra_resources = summary.extra_resources,
            "Added scan unit to report"
        );
        Ok(summary)
    }

    /// Assemble `unit` on the side, then append it to the shared report in one go
    pub async fn add_to_shared_report(
        &self,
        report: &SharedReport,
        unit: &ScanUnit,
    ) -> Result<AssemblySummary, ScaError> {
        let mut scratch = Report::default();
        let summary = self.add_to_report(&mut scratch, unit)?;
        report.lock().await.extend(scratch);
        Ok(summary)
    }

    /// Process independent scan units in parallel into one shared report.
    ///
    /// Each unit's records stay contiguous; the order between units is not
    /// defined. The first failing unit's error is returned after every task
    /// has finished.
    pub async fn add_units_to_shared_report(
        self: Arc<Self>,
        report: SharedReport,
        units: Vec<ScanUnit>,
    ) -> Result<AssemblySummary, ScaError> {
        let mut join_set: JoinSet<Result<AssemblySummary, ScaError>> = JoinSet::new();
        for unit in units {
            let assembler = Arc::clone(&self);
            let report = Arc::clone(&report);
            join_set.spawn(async move { assembler.add_to_shared_report(&report, &unit).await });
        }

        let mut total = AssemblySummary::default();
        let mut first_error = None;
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(Ok(summary)) => total += summary,
                Ok(Err(e)) => {
                    error!("Scan unit rejected: {}", e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!("Join error: {}", e);
                    first_error.get_or_insert(ScaError::Internal(e.to_string()));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }

    /// License findings are always added flat; returns the alias license index
    fn add_license_findings(
        &self,
        report: &mut Report,
        ctx: &ScanContext<'_>,
        unit: &ScanUnit,
        package_types: &HashMap<String, &str>,
        summary: &mut AssemblySummary,
    ) -> LicenseIndex {
        for status in &unit.license_statuses {
            let severity = self.metadata.severity_for(&status.policy);
            let package_type = package_types.get(&status.package_alias()).copied();
            let finding =
                self.normalizer
                    .build_license_finding(ctx, status, package_type, severity);
            let comment = format!("{} is skipped", status.policy);
            self.admit(report, finding, comment, summary);
        }
        LicenseIndex::build(&unit.license_statuses)
    }

    fn add_flat(
        &self,
        report: &mut Report,
        ctx: &ScanContext<'_>,
        unit: &ScanUnit,
        package_types: &HashMap<String, &str>,
        licenses: &LicenseIndex,
        summary: &mut AssemblySummary,
    ) {
        let mut reported: HashSet<String> = HashSet::new();

        for vulnerability in &unit.vulnerabilities {
            let alias = vulnerability.package_alias();
            let package = PackageContext {
                package_type: package_types.get(&alias).copied(),
                licenses: licenses.render(&vulnerability.package_name, &vulnerability.package_version),
                root: None,
            };
            if self.add_cve_finding(report, ctx, vulnerability, &package, summary) {
                reported.insert(alias);
            }
        }

        for package in &unit.packages {
            if !reported.contains(&package.alias()) {
                self.add_extra_resource(report, ctx, package, licenses, summary);
            }
        }
    }

    fn add_with_dependencies(
        &self,
        report: &mut Report,
        ctx: &ScanContext<'_>,
        unit: &ScanUnit,
        graph: &DependencyGraph,
        licenses: &LicenseIndex,
        summary: &mut AssemblySummary,
    ) -> Result<(), ScaError> {
        let packages = &unit.packages;
        let resolution = resolve_dependencies(packages, Some(graph), &unit.vulnerabilities)?;
        let mut reported = vec![false; packages.len()];

        // Each root, then its vulnerable dependencies with the root as provenance.
        // Orphans stand as their own root.
        let attributions = resolution
            .roots
            .iter()
            .flat_map(|root| {
                let deps = root.vulnerable_dependencies.as_deref().unwrap_or_default();
                std::iter::once((root.index, root.index))
                    .chain(deps.iter().map(move |&dep| (dep, root.index)))
            })
            .chain(resolution.orphans.iter().map(|&orphan| (orphan, orphan)));

        for (index, root_index) in attributions {
            let package = &packages[index];
            let root = &packages[root_index];
            let context = PackageContext {
                package_type: Some(package.package_type.as_str()).filter(|t| !t.is_empty()),
                licenses: licenses.render(&package.name, &package.version),
                root: Some(root),
            };
            for vulnerability in resolution.cves_of(index) {
                if self.add_cve_finding(report, ctx, vulnerability, &context, summary) {
                    reported[index] = true;
                }
            }
        }

        for (index, package) in packages.iter().enumerate() {
            if !reported[index] {
                self.add_extra_resource(report, ctx, package, licenses, summary);
            }
        }
        Ok(())
    }

    fn add_cve_finding(
        &self,
        report: &mut Report,
        ctx: &ScanContext<'_>,
        vulnerability: &RawVulnerability,
        package: &PackageContext<'_>,
        summary: &mut AssemblySummary,
    ) -> bool {
        let finding =
            self.normalizer
                .build_cve_finding(ctx, vulnerability, package, self.filter.as_ref());
        let comment = format!("{} is skipped", vulnerability.vulnerability_id());
        self.admit(report, finding, comment, summary)
    }

    /// Apply the policy decision and add the finding unless excluded
    fn admit(
        &self,
        report: &mut Report,
        mut finding: Finding,
        skip_comment: String,
        summary: &mut AssemblySummary,
    ) -> bool {
        let decision = self.filter.decide(
            &finding.check_id,
            &finding.bc_check_id,
            finding.severity,
            self.report_type.as_deref(),
        );

        match decision {
            PolicyDecision::Run => {}
            PolicyDecision::SkipWithComment => finding.suppress(skip_comment),
            PolicyDecision::Exclude => {
                debug!(
                    check_id = %finding.check_id,
                    resource = %finding.resource,
                    "Finding excluded by check selection"
                );
                summary.excluded += 1;
                return false;
            }
        }

        if finding.result() == CheckResult::Skipped {
            summary.skipped += 1;
        }
        summary.records += 1;
        report.add_resource(finding.resource.clone());
        report.add_record(finding);
        true
    }

    fn add_extra_resource(
        &self,
        report: &mut Report,
        ctx: &ScanContext<'_>,
        package: &Package,
        licenses: &LicenseIndex,
        summary: &mut AssemblySummary,
    ) {
        let fallback = Some(package.package_type.as_str()).filter(|t| !t.is_empty());
        report.add_extra_resource(ExtraResource {
            file_abs_path: ctx.file_abs_path.to_string(),
            file_path: file_path_for_record(ctx.rootless_file_path),
            resource: resource_for_record(ctx.rootless_file_path, &package.name),
            details: ExtraResourceDetails {
                package_name: package.name.clone(),
                package_version: package.version.clone(),
                licenses: licenses.render(&package.name, &package.version),
                package_type: ctx.package_type(&package.name, &package.version, fallback),
            },
        });
        summary.extra_resources += 1;
    }
}

/// First non-empty `type` seen for each alias in the package list
fn package_types(packages: &[Package]) -> HashMap<String, &str> {
    let mut types = HashMap::new();
    for package in packages.iter().filter(|p| !p.package_type.is_empty()) {
        types
            .entry(package_alias(&package.name, &package.version))
            .or_insert(package.package_type.as_str());
    }
    types
}
