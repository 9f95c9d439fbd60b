//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which lists every repository
//! path produced by the overlay together with the filesystem path backing it.
//!
//! ## Functionality
//!
//! - **Path Listing**: Shows each mapping's merged tree, in manifest order
//! - **Pattern Filtering**: Supports glob patterns over repository paths
//! - **Detailed Output**: Optional long format showing the owning package and
//!   the mapping state
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::commands::load_session;
use repo_overlay::mapping::MappingState;
use repo_overlay::output::OutputConfig;

/// List repository paths and the files backing them
#[derive(Args, Debug, Default)]
pub struct LsArgs {
    /// Filter repository paths by glob pattern (e.g., "/app/**/*.css").
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Use long listing format showing package and mapping state.
    #[arg(short, long)]
    pub long: bool,

    /// Show only the total count of paths.
    #[arg(long)]
    pub count: bool,
}

/// One listed path
struct PathEntry {
    repository_path: String,
    filesystem_path: PathBuf,
    package: String,
    state: MappingState,
}

/// Execute the `ls` command.
pub fn execute(config_path: &Path, args: LsArgs, output: &OutputConfig) -> Result<()> {
    let session = load_session(config_path)?;

    let mut entries = Vec::new();
    for &id in &session.mappings {
        let mapping = session.overlay.mapping(id)?;
        let package = mapping.containing_package()?.name().to_string();
        let state = mapping.state()?;
        let listed = match &args.pattern {
            Some(pattern) => mapping
                .glob(pattern)
                .map_err(|e| anyhow::anyhow!("Invalid glob pattern '{}': {}", pattern, e))?,
            None => mapping.list_path_mappings()?,
        };
        for (filesystem_path, repository_path) in listed {
            entries.push(PathEntry {
                repository_path: repository_path.to_string(),
                filesystem_path: filesystem_path.to_path_buf(),
                package: package.clone(),
                state,
            });
        }
    }

    if args.count {
        println!("{}", entries.len());
        return Ok(());
    }

    if entries.is_empty() {
        println!("No repository paths found.");
        return Ok(());
    }

    for entry in &entries {
        if args.long {
            println!(
                "{} {:<24} {} -> {}",
                output.state_column(entry.state, 10),
                entry.package,
                entry.repository_path,
                entry.filesystem_path.display()
            );
        } else {
            println!(
                "{} -> {}",
                entry.repository_path,
                entry.filesystem_path.display()
            );
        }
    }

    println!();
    println!(
        "{} path(s) from {} mapping(s)",
        entries.len(),
        session.mappings.len()
    );

    Ok(())
}
