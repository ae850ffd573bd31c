//! proyecto-db CLI
//!
//! Command-line interface for the proyecto-db store suites.

use clap::Parser;
use proyecto_cli::{Cli, Commands};
use proyecto_core::HarnessError;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), HarnessError> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    // Execute command
    match cli.command {
        Commands::Run(cmd) => {
            cmd.execute().await?;
        }
        Commands::Ping(cmd) => {
            cmd.execute().await?;
        }
        Commands::Bootstrap(cmd) => {
            cmd.execute().await?;
        }
        Commands::Config(cmd) => {
            cmd.execute()?;
        }
        Commands::Completion(cmd) => {
            cmd.execute();
        }
    }

    Ok(())
}
