//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `generate`: Generate configuration for one profile
//! - `merge`: Merge several profiles into one artifact
//! - `speedtest`: Generate a speed-test configuration
//! - `validate`: Validate a settings file
//! - `show_settings`: Show the resolved settings
//! - `completions`: Generate shell completion scripts

pub mod completions;
pub mod generate;
pub mod merge;
pub mod show_settings;
pub mod speedtest;
pub mod validate;

pub use completions::CompletionsCommand;
pub use generate::GenerateCommand;
pub use merge::MergeCommand;
pub use show_settings::ShowSettingsCommand;
pub use speedtest::SpeedtestCommand;
pub use validate::ValidateCommand;
