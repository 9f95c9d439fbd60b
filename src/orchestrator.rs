//! Orchestrator for building an overlay from a manifest
//!
//! This module coordinates the steps that turn an `OverlayConfig` into a
//! loaded `Overlay`:
//! 1. Build the package registry, resolving package paths against the
//!    manifest directory
//! 2. Insert one mapping per manifest entry, in declaration order
//! 3. Load every mapping against its owning package
//! 4. Register conflicts for repository paths claimed by several packages

use crate::config::{self, OverlayConfig};
use crate::error::Result;
use crate::filesystem::{DiskFilesystem, Filesystem};
use crate::mapping::PathMapping;
use crate::overlay::{ConflictId, MappingId, Overlay};
use crate::package::{Package, PackageRegistry};
use log::info;
use std::path::Path;

/// Everything produced by one resolution pass
#[derive(Debug)]
pub struct Session {
    pub registry: PackageRegistry,
    pub overlay: Overlay,
    /// Mapping handles in manifest order
    pub mappings: Vec<MappingId>,
    /// Unresolved conflicts found after loading
    pub conflicts: Vec<ConflictId>,
}

impl Session {
    /// True if any mapping recorded a load error
    pub fn has_load_errors(&self) -> bool {
        self.overlay
            .mappings()
            .any(|(_, m)| m.load_errors().is_ok_and(|errors| !errors.is_empty()))
    }
}

/// Execute a complete resolution pass over `config`.
///
/// Relative package paths are joined onto `manifest_dir`.
pub fn execute<F>(config: &OverlayConfig, manifest_dir: &Path, fs: &F) -> Result<Session>
where
    F: Filesystem + ?Sized,
{
    // Step 1: Registry
    let registry = PackageRegistry::from_packages(
        config
            .packages
            .iter()
            .map(|entry| Package::new(entry.name.as_str(), manifest_dir.join(&entry.path)))
            .collect::<Result<Vec<_>>>()?,
    )?;

    // Step 2: Mappings
    let mut overlay = Overlay::new();
    let mut mappings = Vec::with_capacity(config.mappings.len());
    for entry in &config.mappings {
        let mapping = PathMapping::new(entry.path.as_str(), entry.references.clone())?;
        mappings.push(overlay.insert_mapping(mapping));
    }

    // Step 3: Loading
    for (entry, &id) in config.mappings.iter().zip(&mappings) {
        let package = registry.lookup(&entry.package)?;
        overlay.load(id, package, &registry, fs)?;
    }

    // Step 4: Conflict detection
    let conflicts = overlay.detect_conflicts()?;

    info!(
        "Resolved {} mappings across {} packages with {} conflicts",
        mappings.len(),
        registry.len(),
        conflicts.len()
    );

    Ok(Session {
        registry,
        overlay,
        mappings,
        conflicts,
    })
}

/// Load the manifest at `path` and resolve it against the host filesystem
pub fn execute_from_file(path: &Path) -> Result<Session> {
    let config = config::from_file(path)?;
    let manifest_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let fs = DiskFilesystem::with_options(config.options.walk_options());
    execute(&config, manifest_dir, &fs)
}
