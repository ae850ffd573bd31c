//! Ping command implementation

use clap::Args;
use proyecto_core::HarnessError;
use proyecto_runtime::SuiteManager;
use proyecto_types::Store;

use super::selected;

/// Ping command arguments
#[derive(Args, Debug)]
pub struct PingCommand {
    /// Store to check (repeatable; all stores when omitted)
    #[arg(short, long = "store")]
    pub stores: Vec<Store>,
}

impl PingCommand {
    /// Execute the ping command
    pub async fn execute(&self) -> Result<(), HarnessError> {
        let settings = proyecto_settings::settings();
        let manager = SuiteManager::new(settings.clone());
        let results = manager.ping_all(&selected(&self.stores)).await;

        let mut failed = Vec::new();
        for (store, result) in &results {
            match result {
                Ok(()) => println!("ok   {} {}", store.label(), settings.endpoint(*store)),
                Err(message) => {
                    println!("FAIL {} {}: {}", store.label(), settings.endpoint(*store), message);
                    failed.push(store.to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Connection(format!(
                "unreachable: {}",
                failed.join(", ")
            )))
        }
    }
}
