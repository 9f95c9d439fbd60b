//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, which loads the overlay and
//! reports every load error and unresolved conflict. It exits with an error
//! when any problem is found, so it can gate CI pipelines.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use std::path::Path;

use crate::commands::load_session;
use repo_overlay::output::OutputConfig;

/// Execute the `check` command.
pub fn execute(config_path: &Path, output: &OutputConfig) -> Result<()> {
    println!("Loading overlay from: {}", config_path.display());
    let session = load_session(config_path)?;

    let mut problems = 0usize;

    for &id in &session.mappings {
        let mapping = session.overlay.mapping(id)?;
        let package = mapping.containing_package()?.name();
        for error in mapping.load_errors()? {
            problems += 1;
            println!(
                "{} [{}] {}: {}",
                output.error_marker(),
                package,
                mapping.repository_path(),
                error
            );
        }
    }

    for &id in &session.conflicts {
        let conflict = session.overlay.conflict(id)?;
        if conflict.is_resolved() {
            continue;
        }
        problems += 1;
        println!(
            "{} {} is mapped by several packages: {}",
            output.error_marker(),
            conflict.repository_path(),
            conflict.package_names().collect::<Vec<_>>().join(", ")
        );
    }

    if problems > 0 {
        anyhow::bail!("Found {} problem(s) in the overlay", problems);
    }

    println!(
        "OK: {} mapping(s) across {} package(s) loaded without problems",
        session.mappings.len(),
        session.registry.len()
    );
    Ok(())
}
