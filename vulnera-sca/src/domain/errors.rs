//! Errors raised by the correlation engine

/// Contract violations in upstream scan data and collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum ScaError {
    #[error("Package index {index} is out of range for {len} packages")]
    PackageIndexOutOfRange { index: usize, len: usize },

    #[error("Dependency graph covers {graph} packages but the scan lists {packages}")]
    GraphSizeMismatch { graph: usize, packages: usize },

    #[error("Dependency graph key '{0}' is not a package index")]
    InvalidGraphKey(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
