//! Shared test support for vulnera-sca integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;
