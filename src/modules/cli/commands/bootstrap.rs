//! Bootstrap command implementation

use clap::Args;
use proyecto_core::HarnessError;
use proyecto_runtime::{bootstrap, BootstrapPlan};
use proyecto_types::Store;
use tracing::info;

/// Bootstrap command arguments
#[derive(Args, Debug)]
pub struct BootstrapCommand {}

impl BootstrapCommand {
    /// Execute the bootstrap command
    pub async fn execute(&self) -> Result<(), HarnessError> {
        let settings = proyecto_settings::settings();
        let plan = BootstrapPlan::catalog();
        info!(endpoint = %settings.endpoint(Store::Mongodb), database = plan.database, "Bootstrapping MongoDB");

        let summary = bootstrap(&settings.mongo, &plan).await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}
