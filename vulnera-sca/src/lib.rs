//! Vulnera SCA - Software composition analysis correlation and reporting
//!
//! This crate turns raw package inventories and vulnerability/license results
//! from upstream scanners into the canonical findings of a [`Report`].
//!
//! # Scan Data Formats
//!
//! | Format | Source | Fix information |
//! |--------|--------|-----------------|
//! | `TWISTCLI` | Container image scan | `status`: `open` or `fixed in ...` |
//! | `DEPENDENCY_TREE` | Manifest scan with dependency graph | same as image scans |
//! | `PLATFORM` | Remote policy platform | `status` enum plus `cveStatus` |
//!
//! # Features
//!
//! - **Transitive Attribution** - vulnerabilities in dependencies are rolled up to
//!   the root package that pulled them in
//! - **Fix Resolution** - lowest upgrade that actually moves past the installed version
//! - **License Annotation** - every CVE finding carries its package's licenses
//! - **Policy Filtering** - findings are reported, suppressed with a comment, or excluded
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vulnera_sca::{Report, ReportAssembler, ScanUnit, StaticPolicyMetadata};
//!
//! let assembler = ReportAssembler::from_config(&config, Arc::new(StaticPolicyMetadata::new()))?;
//! let mut report = Report::new(&config.sca.check_type);
//! assembler.add_to_report(&mut report, &unit)?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! vulnera-sca/
//! ├── domain/          # Packages, raw vulnerabilities, graph, findings, report
//! ├── services/        # Fix resolver, dependency resolver, license aggregator
//! ├── application/     # Finding normalizer, runner filter
//! ├── infrastructure/  # License-violation client, reduced report export
//! └── use_cases.rs     # Report assembler
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod use_cases;

pub use application::*;
pub use domain::*;
pub use infrastructure::*;
pub use services::*;
pub use use_cases::*;
