//! Domain types for software composition analysis findings

pub mod dependency_graph;
pub mod errors;
pub mod finding;
pub mod package;
pub mod policy;
pub mod report;
pub mod vulnerability;

pub use dependency_graph::{DependencyGraph, PackageIndex, RawDependencyMap};
pub use errors::ScaError;
pub use finding::{
    CheckOutcome, CheckResult, CveDetails, Finding, FindingDetails, FixDetails, LicenseDetails,
    SCA_LICENSE_CHECK_NAME, SCA_PACKAGE_SCAN_CHECK_NAME, UNFIXABLE_VERSION,
};
pub use package::{Package, ScaDetails, package_alias};
pub use policy::{PolicyDecision, PolicyFilter, PolicyMetadata, StaticPolicyMetadata};
pub use report::{ExtraResource, ExtraResourceDetails, Report, SharedReport};
pub use vulnerability::{
    DEFAULT_LICENSE_POLICY, DEFAULT_LICENSE_STATUS, LicenseStatus, RawVulnerability, ScanDataFormat,
};
