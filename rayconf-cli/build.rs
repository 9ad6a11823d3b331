//! Build script for rayconf-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("rayconf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate V2Ray and sing-box client configurations")
        .long_about(
            "Command-line tool for synthesizing proxy engine configurations from stored profiles",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("RAYCONF_DATA_DIR"),
        )
        .arg(
            Arg::new("tun")
                .long("tun")
                .help("Enable tunnel mode for this run")
                .global(true)
                .action(clap::ArgAction::SetTrue)
                .env("RAYCONF_TUN"),
        )
        .subcommands(vec![
            Command::new("generate")
                .about("Generate configuration for one profile")
                .long_about("Generate a V2Ray, sing-box or custom configuration for one profile"),
            Command::new("merge")
                .about("Merge several profiles into one artifact")
                .long_about("Combine several profiles into one index-keyed configuration file"),
            Command::new("speedtest")
                .about("Generate a speed-test configuration")
                .long_about("Generate one configuration with a local listener per profile"),
            Command::new("validate")
                .about("Validate a settings file")
                .long_about("Check a rayconf settings file for errors"),
            Command::new("show-settings")
                .about("Show the resolved settings")
                .long_about("Print the settings in effect after every source is merged"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("rayconf.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
