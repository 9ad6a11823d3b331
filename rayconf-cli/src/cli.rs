//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    CompletionsCommand, GenerateCommand, MergeCommand, ShowSettingsCommand, SpeedtestCommand,
    ValidateCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for generating proxy client configurations.
#[derive(Parser)]
#[command(name = "rayconf")]
#[command(
    version,
    about = "Generate V2Ray and sing-box client configurations",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "RAYCONF_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable tunnel mode for this run
    #[arg(long, global = true, env = "RAYCONF_TUN")]
    pub tun: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate configuration for one profile
    Generate(GenerateCommand),

    /// Merge several profiles into one artifact
    Merge(MergeCommand),

    /// Generate a speed-test configuration
    Speedtest(SpeedtestCommand),

    /// Validate a settings file
    Validate(ValidateCommand),

    /// Show the resolved settings
    ShowSettings(ShowSettingsCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
