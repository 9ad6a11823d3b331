//! Command to generate a speed-test configuration.

use crate::error::CliError;
use crate::utils::{check_outcome, load_profiles, load_settings, select_profiles, GlobalOptions};
use clap::Args;
use rayconf::handler::generate_speedtest_config;
use rayconf::{SpeedtestItem, SystemOccupancyChecker};
use std::path::PathBuf;

/// Generate a speed-test configuration.
#[derive(Args)]
pub struct SpeedtestCommand {
    /// Profile store file
    #[arg(long, value_name = "FILE")]
    pub profiles: PathBuf,

    /// Profiles to test (default: every profile in the store)
    #[arg(long, value_name = "ID")]
    pub select: Vec<String>,
}

impl SpeedtestCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let settings = load_settings(global)?;
        let store = load_profiles(&self.profiles)?;

        let mut items: Vec<SpeedtestItem> = select_profiles(&store, &self.select)?
            .into_iter()
            .cloned()
            .map(SpeedtestItem::new)
            .collect();

        let outcome = check_outcome(generate_speedtest_config(
            &mut items,
            &settings,
            &SystemOccupancyChecker,
        ))?;

        println!("{}", outcome.content);

        if !global.quiet {
            for item in &items {
                if let Some(port) = item.port {
                    eprintln!("{}\t{port}", item.profile.label());
                }
            }
        }

        Ok(())
    }
}
