//! Config command implementation

use clap::Args;
use proyecto_core::{HarnessError, Settings};

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Print passwords instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
}

impl ConfigCommand {
    /// Execute the config command
    pub fn execute(&self) -> Result<(), HarnessError> {
        println!("{}", self.render(proyecto_settings::settings())?);
        Ok(())
    }

    fn render(&self, settings: &Settings) -> Result<String, HarnessError> {
        let shown = if self.show_secrets {
            settings.clone()
        } else {
            settings.redacted()
        };
        Ok(serde_json::to_string_pretty(&shown)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proyecto_settings::{resolve, MapEnv};

    #[test]
    fn test_render_masks_passwords() {
        let settings = resolve(&MapEnv::new().with("MYSQL_PASSWORD", "hunter2"));

        let masked = ConfigCommand { show_secrets: false }.render(&settings).unwrap();
        assert!(!masked.contains("hunter2"));

        let shown = ConfigCommand { show_secrets: true }.render(&settings).unwrap();
        assert!(shown.contains("hunter2"));
    }
}
