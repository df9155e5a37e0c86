//! Domain Layer - Shared value objects
//!
//! Value objects used by every crate in the workspace: package versions with
//! lenient parsing and the normalized severity scale.

pub mod value_objects;

pub use value_objects::*;
