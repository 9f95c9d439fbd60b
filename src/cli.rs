//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use repo_overlay::defaults::{DEFAULT_CONFIG_FILENAME, DEFAULT_LOG_LEVEL};
use repo_overlay::output::OutputConfig;

/// Repository Overlay - Merge package file trees into one repository namespace
#[derive(Parser, Debug)]
#[command(name = "repo-overlay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the overlay manifest
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List repository paths and the filesystem paths backing them
    Ls(commands::ls::LsArgs),

    /// List unresolved conflicts between packages
    Conflicts(commands::conflicts::ConflictsArgs),

    /// Report load errors and conflicts; fails if any exist
    Check,

    /// Show each mapping's repository path tree
    Tree(commands::tree::TreeArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .try_init();

        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Ls(args) => commands::ls::execute(&self.config, args, &output),
            Commands::Conflicts(args) => {
                commands::conflicts::execute(&self.config, args, &output)
            }
            Commands::Check => commands::check::execute(&self.config, &output),
            Commands::Tree(args) => commands::tree::execute(&self.config, args),
        }
    }
}
