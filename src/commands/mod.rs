//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-overlay` command-line tool. Each subcommand is defined in its own
//! file and exposes an `execute` function; commands with options also define
//! an `Args` struct derived with `clap`.
//!
//! Every command starts the same way: load the manifest and run a full
//! resolution pass with [`load_session`].

pub mod check;
pub mod conflicts;
pub mod ls;
pub mod tree;

use anyhow::Result;
use std::path::Path;

use repo_overlay::orchestrator::{self, Session};

/// Load the manifest at `config_path` and resolve it against the disk.
pub fn load_session(config_path: &Path) -> Result<Session> {
    if !config_path.exists() {
        anyhow::bail!(
            "Configuration file not found: {}\n  hint: create a {} manifest or pass --config",
            config_path.display(),
            repo_overlay::defaults::DEFAULT_CONFIG_FILENAME
        );
    }

    orchestrator::execute_from_file(config_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load overlay from {}: {}",
            config_path.display(),
            e
        )
    })
}
