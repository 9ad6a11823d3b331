//! Command to merge several profiles into one configuration artifact.

use crate::error::CliError;
use crate::utils::{check_outcome, load_profiles, load_settings, select_profiles, GlobalOptions};
use clap::Args;
use rayconf::handler::generate_client_configs;
use std::path::PathBuf;

/// Merge several profiles into one artifact.
#[derive(Args)]
pub struct MergeCommand {
    /// Profile store file
    #[arg(long, value_name = "FILE")]
    pub profiles: PathBuf,

    /// Profiles to merge, in order (default: every profile in the store)
    #[arg(long, value_name = "ID")]
    pub select: Vec<String>,

    /// Destination of the merged artifact
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,
}

impl MergeCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let settings = load_settings(global)?;
        let store = load_profiles(&self.profiles)?;
        let selected = select_profiles(&store, &self.select)?;

        if global.verbose {
            eprintln!("Merging {} profile(s)", selected.len());
        }

        let outcome = check_outcome(generate_client_configs(
            selected.into_iter().map(Some),
            &settings,
            &self.output,
        ))?;

        if !global.quiet {
            eprintln!("{}: {}", outcome.message, self.output.display());
        }

        Ok(())
    }
}
