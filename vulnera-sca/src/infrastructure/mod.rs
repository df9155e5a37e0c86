//! Infrastructure: platform license client and report export

pub mod export;
pub mod license_client;

pub use export::*;
pub use license_client::*;
