//! Main entry point for the rayconf CLI.
//!
//! This is the command-line interface for the rayconf configuration
//! generator. It provides commands for:
//! - `generate`: Generate configuration for one profile
//! - `merge`: Merge several profiles into one artifact
//! - `speedtest`: Generate a speed-test configuration
//! - `validate`: Validate a settings file
//! - `show-settings`: Show the resolved settings

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    // Route library log records through the CLI logger
    let logger = rayconf::init_logger(cli.verbose, cli.quiet);
    if let Err(e) = rayconf::install_logger(logger) {
        eprintln!("Warning: failed to install logger: {e}");
    }

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        tun: cli.tun,
    };

    let result = match cli.command {
        cli::Command::Generate(cmd) => cmd.execute(&global),
        cli::Command::Merge(cmd) => cmd.execute(&global),
        cli::Command::Speedtest(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
        cli::Command::ShowSettings(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
