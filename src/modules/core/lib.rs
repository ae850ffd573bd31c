//! Core domain logic for proyecto-db
//!
//! This crate contains the settings model, the fixture records written to each
//! store, the assertion helpers and the error type shared by the harness.

pub mod check;
pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{HarnessError, Result};
