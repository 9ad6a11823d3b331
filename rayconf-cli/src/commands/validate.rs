//! Command to validate a rayconf settings file.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use rayconf::config::{Settings, SettingsValidator};
use std::path::PathBuf;

/// Validate a rayconf settings file.
#[derive(Args)]
pub struct ValidateCommand {
    /// Settings file to validate
    #[arg(value_name = "CONFIG_PATH")]
    pub config_path: PathBuf,
}

impl ValidateCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        if !self.config_path.exists() {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                self.config_path.display()
            )));
        }

        let contents = std::fs::read_to_string(&self.config_path)?;
        let settings: Settings = serde_yaml::from_str(&contents).map_err(|e| {
            eprintln!("Parse error: {e}");
            CliError::Config("Settings file is invalid".to_string())
        })?;

        match SettingsValidator::validate(&settings) {
            Ok(()) => {
                println!("Settings are valid");
                Ok(())
            }
            Err(e) => {
                eprintln!("Validation error: {e}");
                Err(CliError::Config("Settings validation failed".to_string()))
            }
        }
    }
}
