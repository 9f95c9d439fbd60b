//! # Path Mappings
//!
//! A `PathMapping` is one declared rule: "repository path P is backed by the
//! filesystem locations named by these path references". Loading a mapping
//! resolves each reference against the owning package (or another package
//! for `@package:path` references), expands every resolved location into a
//! tree, and merges those trees into one ordered repository-path listing.
//!
//! ## Lifecycle
//!
//! A mapping starts unloaded. `load()` moves it to loaded exactly once;
//! loading again is an error. While loaded, the mapping is either enabled
//! (at least one reference resolved) or not found (none did). Whether it is
//! conflicting is a separate axis, driven by the conflict graph that the
//! [`Overlay`](crate::overlay::Overlay) maintains.
//!
//! ## Merge order
//!
//! References are processed in declaration order. When two references of
//! the same mapping produce the same repository subpath, the first one wins
//! and the later entry is dropped from the listing.

use crate::error::{Error, LoadError, Result};
use crate::filesystem::Filesystem;
use crate::overlay::ConflictId;
use crate::package::{Package, PackageRegistry};
use crate::path::{compile_glob, join_repository_path, package_path, PathReference};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Path references as declared: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum References {
    One(String),
    Many(Vec<String>),
}

impl References {
    fn into_vec(self) -> Vec<String> {
        match self {
            References::One(reference) => vec![reference],
            References::Many(references) => references,
        }
    }
}

impl From<&str> for References {
    fn from(reference: &str) -> Self {
        References::One(reference.to_string())
    }
}

impl From<String> for References {
    fn from(reference: String) -> Self {
        References::One(reference)
    }
}

impl From<Vec<String>> for References {
    fn from(references: Vec<String>) -> Self {
        References::Many(references)
    }
}

impl From<Vec<&str>> for References {
    fn from(references: Vec<&str>) -> Self {
        References::Many(references.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for References {
    fn from(references: [&str; N]) -> Self {
        References::Many(references.iter().map(|r| r.to_string()).collect())
    }
}

/// Reported state of a loaded mapping.
///
/// `Conflict` takes precedence when a mapping is both conflicting and
/// enabled; use [`PathMapping::is_enabled`] to query the other axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingState {
    Enabled,
    NotFound,
    Conflict,
}

impl fmt::Display for MappingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MappingState::Enabled => "enabled",
            MappingState::NotFound => "not-found",
            MappingState::Conflict => "conflict",
        };
        f.write_str(label)
    }
}

/// The fields of a loaded mapping that queries can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingFields<'a> {
    pub repository_path: &'a str,
    pub containing_package: &'a str,
    pub state: MappingState,
}

/// State that only exists between `load()` and `unload()`.
#[derive(Debug, Clone)]
struct LoadedState {
    package: Package,
    filesystem_paths: Vec<PathBuf>,
    load_errors: Vec<LoadError>,
    /// Repository path -> backing filesystem path, in insertion order.
    tree: IndexMap<String, PathBuf>,
}

/// A rule binding a repository path to one or more path references.
#[derive(Debug, Clone)]
pub struct PathMapping {
    repository_path: String,
    path_references: Vec<String>,
    loaded: Option<LoadedState>,
    conflicts: BTreeSet<ConflictId>,
}

impl PathMapping {
    /// Creates an unloaded mapping.
    ///
    /// The repository path must not be empty, and there must be at least one
    /// reference, none of them empty.
    pub fn new(repository_path: impl Into<String>, references: impl Into<References>) -> Result<Self> {
        let repository_path = repository_path.into();
        if repository_path.is_empty() {
            return Err(Error::InvalidArgument {
                message: "The repository path must not be empty.".to_string(),
            });
        }

        let path_references = references.into().into_vec();
        if path_references.is_empty() {
            return Err(Error::InvalidArgument {
                message: format!(
                    "The mapping for {} must have at least one path reference.",
                    repository_path
                ),
            });
        }
        if path_references.iter().any(String::is_empty) {
            return Err(Error::InvalidArgument {
                message: format!(
                    "The path references of the mapping for {} must not be empty.",
                    repository_path
                ),
            });
        }

        Ok(Self {
            repository_path,
            path_references,
            loaded: None,
            conflicts: BTreeSet::new(),
        })
    }

    pub fn repository_path(&self) -> &str {
        &self.repository_path
    }

    /// The references exactly as declared
    pub fn path_references(&self) -> &[String] {
        &self.path_references
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Resolves the references and builds the repository path tree.
    ///
    /// Missing packages and missing paths are recorded as load errors and do
    /// not stop the load. Only misuse (loading twice) and I/O failures while
    /// walking a resolved tree are returned as errors; in both cases the
    /// mapping is left untouched.
    pub fn load<F>(&mut self, package: &Package, registry: &PackageRegistry, fs: &F) -> Result<()>
    where
        F: Filesystem + ?Sized,
    {
        if self.loaded.is_some() {
            return Err(Error::AlreadyLoaded {
                repository_path: self.repository_path.clone(),
            });
        }

        let mut filesystem_paths = Vec::new();
        let mut load_errors = Vec::new();
        let mut tree: IndexMap<String, PathBuf> = IndexMap::new();

        for (index, raw) in self.path_references.iter().enumerate() {
            let reference = PathReference::parse(raw);

            let base = match reference.package() {
                None => package,
                Some(name) => match registry.lookup(name) {
                    Ok(found) => found,
                    Err(_) => {
                        let error = LoadError::PackageNotFound {
                            index,
                            reference: raw.clone(),
                            name: name.to_string(),
                        };
                        warn!("{}", error);
                        load_errors.push(error);
                        continue;
                    }
                },
            };

            let candidate = package_path(base.base_dir(), reference.relative_path());
            if !fs.exists(&candidate) {
                let error = LoadError::PathNotFound {
                    index,
                    reference: raw.clone(),
                    path: candidate,
                    repository_path: self.repository_path.clone(),
                    package: package.name().to_string(),
                };
                warn!("{}", error);
                load_errors.push(error);
                continue;
            }

            let entries = fs.list_tree(&candidate)?;
            debug!(
                "Expanded {} to {} entries for {}",
                candidate.display(),
                entries.len(),
                self.repository_path
            );

            for entry in entries {
                let repository_path = join_repository_path(&self.repository_path, &entry.relative);
                tree.entry(repository_path).or_insert(entry.path);
            }
            filesystem_paths.push(candidate);
        }

        debug!(
            "Loaded mapping {} for package {}: {} of {} references resolved",
            self.repository_path,
            package.name(),
            filesystem_paths.len(),
            self.path_references.len()
        );

        self.loaded = Some(LoadedState {
            package: package.clone(),
            filesystem_paths,
            load_errors,
            tree,
        });

        Ok(())
    }

    /// Clears all load-derived state.
    ///
    /// Conflict memberships are graph edges owned by the overlay; inside an
    /// [`Overlay`](crate::overlay::Overlay) use `Overlay::unload`, which
    /// detaches them before calling this.
    pub fn unload(&mut self) -> Result<()> {
        if self.loaded.take().is_none() {
            return Err(self.not_loaded());
        }
        self.conflicts.clear();
        Ok(())
    }

    /// Resolved filesystem paths, one per successful reference, in order
    pub fn filesystem_paths(&self) -> Result<&[PathBuf]> {
        Ok(&self.state_ref()?.filesystem_paths)
    }

    /// The merged tree as `(filesystem path, repository path)` pairs.
    pub fn list_path_mappings(&self) -> Result<Vec<(&Path, &str)>> {
        Ok(self
            .state_ref()?
            .tree
            .iter()
            .map(|(repository_path, path)| (path.as_path(), repository_path.as_str()))
            .collect())
    }

    /// The repository path column of [`list_path_mappings`](Self::list_path_mappings).
    pub fn list_repository_paths(&self) -> Result<Vec<&str>> {
        Ok(self.state_ref()?.tree.keys().map(String::as_str).collect())
    }

    /// The entries of [`list_path_mappings`](Self::list_path_mappings) whose
    /// repository path matches the glob `pattern`.
    pub fn glob(&self, pattern: &str) -> Result<Vec<(&Path, &str)>> {
        let pattern = compile_glob(pattern)?;
        let mut entries = self.list_path_mappings()?;
        entries.retain(|(_, repository_path)| pattern.matches(repository_path));
        Ok(entries)
    }

    /// Filesystem path backing `repository_path`, if this mapping produces it
    pub fn filesystem_path_for(&self, repository_path: &str) -> Result<Option<&Path>> {
        Ok(self
            .state_ref()?
            .tree
            .get(repository_path)
            .map(PathBuf::as_path))
    }

    pub fn load_errors(&self) -> Result<&[LoadError]> {
        Ok(&self.state_ref()?.load_errors)
    }

    pub fn containing_package(&self) -> Result<&Package> {
        Ok(&self.state_ref()?.package)
    }

    /// True if loaded and at least one reference resolved
    pub fn is_enabled(&self) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|state| !state.filesystem_paths.is_empty())
    }

    /// True if loaded and no reference resolved
    pub fn is_not_found(&self) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|state| state.filesystem_paths.is_empty())
    }

    pub fn is_conflicting(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn state(&self) -> Result<MappingState> {
        let loaded = self.state_ref()?;
        Ok(if self.is_conflicting() {
            MappingState::Conflict
        } else if loaded.filesystem_paths.is_empty() {
            MappingState::NotFound
        } else {
            MappingState::Enabled
        })
    }

    /// Conflicts this mapping currently belongs to
    pub fn conflicts(&self) -> impl Iterator<Item = ConflictId> + '_ {
        self.conflicts.iter().copied()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    pub fn fields(&self) -> Result<MappingFields<'_>> {
        Ok(MappingFields {
            repository_path: &self.repository_path,
            containing_package: self.state_ref()?.package.name(),
            state: self.state()?,
        })
    }

    /// Evaluates `predicate` against this mapping's query fields.
    pub fn matches<P>(&self, predicate: P) -> Result<bool>
    where
        P: FnOnce(&MappingFields<'_>) -> bool,
    {
        Ok(predicate(&self.fields()?))
    }

    pub(crate) fn has_conflict(&self, conflict: ConflictId) -> bool {
        self.conflicts.contains(&conflict)
    }

    pub(crate) fn insert_conflict(&mut self, conflict: ConflictId) {
        self.conflicts.insert(conflict);
    }

    pub(crate) fn remove_conflict_edge(&mut self, conflict: ConflictId) -> bool {
        self.conflicts.remove(&conflict)
    }

    pub(crate) fn ensure_loaded(&self) -> Result<()> {
        self.state_ref().map(|_| ())
    }

    fn state_ref(&self) -> Result<&LoadedState> {
        self.loaded.as_ref().ok_or_else(|| self.not_loaded())
    }

    fn not_loaded(&self) -> Error {
        Error::NotLoaded {
            repository_path: self.repository_path.clone(),
        }
    }
}
