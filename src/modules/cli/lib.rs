//! proyecto-db CLI
//!
//! This crate provides the command-line interface for proyecto-db including:
//! - run: Run the store suites
//! - ping: Health-check the stores
//! - bootstrap: Create the MongoDB catalog user, collections and indexes
//! - config: Print the resolved connection settings
//! - completion: Generate shell completions

pub mod commands;

pub use commands::{Cli, Commands};
