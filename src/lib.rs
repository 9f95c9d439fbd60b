//! # Repository Overlay Library
//!
//! This library overlays the file trees of many independently versioned
//! packages into one logical namespace of repository paths. Packages declare
//! mappings ("repository path `/app` is backed by my `resources` directory,
//! and by `@vendor/other:assets`"); the library resolves those mappings into
//! concrete trees and tracks which mappings collide on the same repository
//! path.
//!
//! ## Quick Example
//!
//! ```
//! use repo_overlay::filesystem::MemoryFS;
//! use repo_overlay::mapping::PathMapping;
//! use repo_overlay::overlay::Overlay;
//! use repo_overlay::package::{Package, PackageRegistry};
//!
//! let mut fs = MemoryFS::new();
//! fs.add_file("/pkg1/resources/css/style.css").unwrap();
//! fs.add_file("/pkg2/resources/css/style.css").unwrap();
//!
//! let pkg1 = Package::new("vendor/pkg1", "/pkg1").unwrap();
//! let pkg2 = Package::new("vendor/pkg2", "/pkg2").unwrap();
//! let registry = PackageRegistry::from_packages(vec![pkg1.clone(), pkg2.clone()]).unwrap();
//!
//! let mut overlay = Overlay::new();
//! let m1 = overlay.insert_mapping(PathMapping::new("/app", "resources").unwrap());
//! let m2 = overlay.insert_mapping(PathMapping::new("/app", "resources").unwrap());
//! overlay.load(m1, &pkg1, &registry, &fs).unwrap();
//! overlay.load(m2, &pkg2, &registry, &fs).unwrap();
//!
//! assert_eq!(
//!     overlay.mapping(m1).unwrap().list_repository_paths().unwrap(),
//!     vec!["/app", "/app/css", "/app/css/style.css"]
//! );
//!
//! let conflicts = overlay.detect_conflicts().unwrap();
//! assert_eq!(conflicts.len(), 1);
//! assert!(overlay.conflicting_packages(m1).unwrap().contains("vendor/pkg2"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Packages (`package`)**: Named base directories collected in a
//!   `PackageRegistry`, which is passed explicitly into every load.
//! - **Path references (`path`)**: Either relative to the owning package or
//!   `@package:path` relative to another package.
//! - **Filesystem (`filesystem`)**: The `Filesystem` trait used to check
//!   existence and expand trees, with disk and in-memory implementations.
//! - **Mappings (`mapping`)**: One declared rule, its load lifecycle and its
//!   merged repository path tree.
//! - **Conflicts (`conflict`)**: A repository path claimed by several
//!   packages' mappings.
//! - **Overlay (`overlay`)**: The arena owning mappings and conflicts; every
//!   change to the conflict graph goes through it.
//!
//! ## Execution Flow
//!
//! The `orchestrator` runs a whole pass from an overlay manifest:
//!
//! 1.  **Registry**: Build the package registry from the manifest.
//! 2.  **Mappings**: Create one mapping per manifest entry.
//! 3.  **Loading**: Resolve references and expand trees for every mapping.
//! 4.  **Conflicts**: Register conflicts for paths claimed by several packages.

pub mod config;
pub mod conflict;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod mapping;
pub mod orchestrator;
pub mod output;
pub mod overlay;
pub mod package;
pub mod path;

#[cfg(test)]
mod path_proptest;
