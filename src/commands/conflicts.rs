//! # Conflicts Command Implementation
//!
//! Lists the repository paths that are claimed by mappings of more than one
//! package, as text or JSON.

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::Path;

use crate::commands::load_session;
use repo_overlay::orchestrator::Session;
use repo_overlay::output::OutputConfig;

/// List unresolved conflicts
#[derive(Args, Debug, Default)]
pub struct ConflictsArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A conflict as reported to the user
#[derive(Debug, Serialize)]
struct ConflictReport {
    repository_path: String,
    packages: Vec<String>,
}

fn collect(session: &Session) -> Result<Vec<ConflictReport>> {
    let mut reports = Vec::new();
    for &id in &session.conflicts {
        let conflict = session.overlay.conflict(id)?;
        if conflict.is_resolved() {
            continue;
        }
        reports.push(ConflictReport {
            repository_path: conflict.repository_path().to_string(),
            packages: conflict.package_names().map(str::to_string).collect(),
        });
    }
    Ok(reports)
}

/// Execute the `conflicts` command.
pub fn execute(config_path: &Path, args: ConflictsArgs, output: &OutputConfig) -> Result<()> {
    let session = load_session(config_path)?;
    let reports = collect(&session)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Text => {
            if reports.is_empty() {
                println!("No conflicts.");
                return Ok(());
            }
            for report in &reports {
                println!(
                    "{} {}: {}",
                    output.state_label(repo_overlay::mapping::MappingState::Conflict),
                    report.repository_path,
                    report.packages.join(", ")
                );
            }
            println!();
            println!("{} conflict(s)", reports.len());
        }
    }

    Ok(())
}
