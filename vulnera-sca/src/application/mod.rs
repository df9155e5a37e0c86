//! Application layer: finding normalization and policy selection

pub mod normalizer;
pub mod runner_filter;

pub use normalizer::*;
pub use runner_filter::*;
