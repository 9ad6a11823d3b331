//! Command to show the resolved settings.

use crate::error::CliError;
use crate::utils::{load_settings, GlobalOptions};
use clap::Args;

/// Show the resolved settings as YAML.
#[derive(Args)]
pub struct ShowSettingsCommand {}

impl ShowSettingsCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let settings = load_settings(global)?;
        let yaml = serde_yaml::to_string(&settings)
            .map_err(|e| CliError::Library(rayconf::Error::from(e)))?;
        print!("{yaml}");
        Ok(())
    }
}
