//! Correlation services
//!
//! Pure, synchronous building blocks used by the report assembler.

pub mod dependency_resolver;
pub mod license_aggregator;
pub mod version_resolution;

pub use dependency_resolver::*;
pub use license_aggregator::*;
pub use version_resolution::*;
