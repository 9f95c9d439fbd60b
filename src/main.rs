//! # Repository Overlay CLI
//!
//! This is the binary entry point for the `repo-overlay` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors and translating them into user-friendly
//!   output.
//!
//! The overlay logic lives in the `repo_overlay` library crate; the binary is
//! a thin wrapper that loads a manifest and reports on the result.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
