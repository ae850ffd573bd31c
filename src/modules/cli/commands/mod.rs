//! CLI commands

mod bootstrap;
mod completion;
mod config;
mod ping;
mod run;

pub use bootstrap::BootstrapCommand;
pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use ping::PingCommand;
pub use run::RunCommand;

use clap::{Parser, Subcommand};
use proyecto_types::Store;

/// proyecto-db - CRUD checks against MySQL, PostgreSQL, MongoDB and Redis
#[derive(Parser, Debug)]
#[command(name = "proyecto")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the store suites
    Run(RunCommand),

    /// Check that each store accepts connections
    Ping(PingCommand),

    /// Create the MongoDB catalog user, collections and indexes
    Bootstrap(BootstrapCommand),

    /// Print the resolved connection settings
    Config(ConfigCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completion(CompletionCommand),
}

/// Selected stores, or all of them when none were given
pub(crate) fn selected(stores: &[Store]) -> Vec<Store> {
    if stores.is_empty() {
        Store::all().to_vec()
    } else {
        stores.to_vec()
    }
}
