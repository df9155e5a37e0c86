//! Reduced report export
//!
//! Reports are shipped to external storage in a compact form: only the fields
//! needed to reconcile check results, grouped by outcome and keyed by check type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::domain::{CheckOutcome, Finding, Report, ScaError};

const RESULTS_PREFIX: &str = "checkov_results";
const RESULTS_FILE: &str = "checks_results.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedCheck {
    pub check_id: String,
    pub check_result: CheckOutcome,
    pub resource: String,
    pub file_path: String,
    pub file_line_range: [u32; 2],
}

impl From<&Finding> for ReducedCheck {
    fn from(finding: &Finding) -> Self {
        Self {
            check_id: finding.check_id.clone(),
            check_result: finding.check_result.clone(),
            resource: finding.resource.clone(),
            file_path: finding.file_path.clone(),
            file_line_range: finding.file_line_range,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedChecks {
    pub passed_checks: Vec<ReducedCheck>,
    pub failed_checks: Vec<ReducedCheck>,
    pub skipped_checks: Vec<ReducedCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedReport {
    pub checks: ReducedChecks,
}

pub fn reduce_report(report: &Report) -> ReducedReport {
    ReducedReport {
        checks: ReducedChecks {
            passed_checks: report.passed_checks().map(ReducedCheck::from).collect(),
            failed_checks: report.failed_checks().map(ReducedCheck::from).collect(),
            skipped_checks: report.skipped_checks().map(ReducedCheck::from).collect(),
        },
    }
}

/// Reduce several reports, keyed by check type
pub fn reduce_scan_reports(reports: &[Report]) -> BTreeMap<String, ReducedReport> {
    reports
        .iter()
        .map(|report| (report.check_type.clone(), reduce_report(report)))
        .collect()
}

/// Object path of the reduced results for one check type
pub fn checks_results_path(full_repo_object_key: &str, check_type: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        full_repo_object_key, RESULTS_PREFIX, check_type, RESULTS_FILE
    )
}

/// JSON object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_json(
        &self,
        bucket: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), ScaError>;

    async fn get_json(&self, bucket: &str, key: &str)
    -> Result<Option<serde_json::Value>, ScaError>;
}

/// Write every reduced report to the store; returns the object path per check type.
///
/// A failed write is logged and returned: losing results is fatal to the caller.
pub async fn persist_checks_results(
    reduced_reports: &BTreeMap<String, ReducedReport>,
    store: &dyn BlobStore,
    bucket: &str,
    full_repo_object_key: &str,
) -> Result<BTreeMap<String, String>, ScaError> {
    let mut paths = BTreeMap::new();

    for (check_type, reduced) in reduced_reports {
        let path = checks_results_path(full_repo_object_key, check_type);
        let value = serde_json::to_value(reduced).map_err(|e| {
            ScaError::Persistence(format!("Failed to serialize {} results: {}", check_type, e))
        })?;

        if let Err(e) = store.put_json(bucket, &path, &value).await {
            error!(bucket, path = %path, error = %e, "Failed to persist checks results");
            return Err(e);
        }
        paths.insert(check_type.clone(), path);
    }

    info!(
        "Persisted checks results for {} check types into {}",
        paths.len(),
        bucket
    );
    Ok(paths)
}

/// Read back the reduced results of one check type, `None` when absent
pub async fn load_checks_results(
    store: &dyn BlobStore,
    bucket: &str,
    full_repo_object_key: &str,
    check_type: &str,
) -> Result<Option<ReducedReport>, ScaError> {
    let path = checks_results_path(full_repo_object_key, check_type);
    let Some(value) = store.get_json(bucket, &path).await? else {
        warn!(bucket, path = %path, "No checks results stored");
        return Ok(None);
    };

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ScaError::Persistence(format!("Malformed checks results at {}: {}", path, e)))
}

/// Process-local [`BlobStore`]
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put_json(
        &self,
        bucket: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), ScaError> {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), value.clone());
        Ok(())
    }

    async fn get_json(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, ScaError> {
        Ok(self
            .objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }
}
