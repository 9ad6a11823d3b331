//! Command to generate configuration for a single profile.

use crate::error::CliError;
use crate::utils::{check_outcome, load_profiles, load_settings, GlobalOptions};
use clap::Args;
use rayconf::handler::generate_client_config;
use std::path::PathBuf;

/// Generate configuration for one profile.
#[derive(Args)]
pub struct GenerateCommand {
    /// Profile store file
    #[arg(long, value_name = "FILE")]
    pub profiles: PathBuf,

    /// Profile to generate (index id, remarks, or position)
    #[arg(long, value_name = "ID")]
    pub select: String,

    /// Write the configuration here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl GenerateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let settings = load_settings(global)?;
        let store = load_profiles(&self.profiles)?;

        let profile = store.find(&self.select).ok_or_else(|| {
            CliError::InvalidArguments(format!("Unknown profile: {}", self.select))
        })?;

        let outcome = check_outcome(generate_client_config(
            Some(profile),
            &settings,
            self.output.as_deref(),
        ))?;

        match self.output {
            None => println!("{}", outcome.content),
            Some(path) => {
                if !global.quiet {
                    eprintln!("{}: {}", outcome.message, path.display());
                }
            }
        }

        Ok(())
    }
}
