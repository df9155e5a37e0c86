//! Test data fixtures for vulnera-sca

use std::collections::HashMap;
use vulnera_core::config::PolicyConfig;
use vulnera_sca::{LicenseStatus, Package, RawVulnerability, ScanUnit};

pub const FILE_PATH: &str = "app/package.json";
pub const ABS_FILE_PATH: &str = "/repo/app/package.json";

pub fn license_status(name: &str, version: &str, license: &str, status: &str) -> LicenseStatus {
    LicenseStatus {
        package_name: name.to_string(),
        package_version: version.to_string(),
        policy: "BC_LIC1".to_string(),
        license: license.to_string(),
        status: status.to_string(),
    }
}

pub fn vulnerability(name: &str, version: &str, id: &str, severity: &str) -> RawVulnerability {
    RawVulnerability::new(name, version, id).with_severity(severity)
}

/// `a@1 -> b@2 -> c@3` with `a` the only root and one CVE on `c`
pub fn chain_unit() -> ScanUnit {
    let mut unit = ScanUnit::new(FILE_PATH, ABS_FILE_PATH);
    unit.packages = vec![
        Package::new("a", "1").with_type("npm").as_root(),
        Package::new("b", "2").with_type("npm"),
        Package::new("c", "3").with_type("npm"),
    ];
    unit.dependencies = Some(HashMap::from([
        ("0".to_string(), vec![1]),
        ("1".to_string(), vec![2]),
    ]));
    unit.vulnerabilities = vec![
        vulnerability("c", "3", "CVE-2021-1234", "high").with_status("fixed in 2.0.0, 3.1.0"),
    ];
    unit
}

/// Image scan without dependency data
pub fn flat_unit() -> ScanUnit {
    let mut unit = ScanUnit::new("Dockerfile", "/repo/Dockerfile");
    unit.packages = vec![
        Package::new("openssl", "1.1.1").with_type("os"),
        Package::new("zlib", "1.2.11").with_type("os"),
        Package::new("curl", "7.68.0").with_type("os"),
    ];
    unit.vulnerabilities = vec![
        vulnerability("openssl", "1.1.1", "CVE-2022-0778", "high"),
        vulnerability("openssl", "1.1.1", "CVE-2021-3711", "critical"),
        vulnerability("curl", "7.68.0", "CVE-2020-8177", "low"),
    ];
    unit
}

pub fn policy(checks: &[&str], skip_checks: &[&str]) -> PolicyConfig {
    PolicyConfig {
        checks: checks.iter().map(|s| s.to_string()).collect(),
        skip_checks: skip_checks.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}
