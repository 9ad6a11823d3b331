//! Shell completion generation command.
//!
//! This module provides the `completions` command which generates shell completion
//! scripts for bash, zsh, fish, and PowerShell.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;

/// Name of the installed binary
const BIN_NAME: &str = "rayconf";

/// Generate shell completion scripts
#[derive(Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut cmd = Cli::command();

        if !global.quiet {
            eprintln!("# Generating {} completion script", self.shell);
            match self.shell {
                Shell::Bash => {
                    eprintln!("# Enable with:");
                    eprintln!("#   eval \"$(rayconf completions bash)\"");
                }
                Shell::Zsh => {
                    eprintln!("# Install with:");
                    eprintln!("#   rayconf completions zsh > ~/.zsh/completions/_rayconf");
                }
                Shell::Fish => {
                    eprintln!("# Enable with:");
                    eprintln!("#   rayconf completions fish | source");
                }
                Shell::PowerShell => {
                    eprintln!("# Enable with:");
                    eprintln!("#   rayconf completions powershell | Out-String | Invoke-Expression");
                }
                _ => {}
            }
            eprintln!();
        }

        generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout());

        Ok(())
    }
}
