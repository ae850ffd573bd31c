//! Store suites for proyecto-db
//!
//! This crate provides the CRUD suites for MySQL, PostgreSQL, MongoDB and
//! Redis, the runner that records their steps, and the MongoDB catalog
//! bootstrap.

pub mod bootstrap;
pub mod suites;

pub use bootstrap::{bootstrap, BootstrapPlan, BootstrapSummary, CollectionSpec};
pub use suites::{run_suite, StepRecorder, Suite, SuiteManager, SuiteReport};
