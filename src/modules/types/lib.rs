//! Type definitions for proyecto-db
//!
//! Shared types used across the harness crates.

pub mod store;

pub use store::Store;
