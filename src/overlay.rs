//! # The Mapping Overlay
//!
//! `Overlay` owns every `PathMapping` and `PathConflict` taking part in one
//! resolution pass and hands out copyable handles (`MappingId`,
//! `ConflictId`) for them. Each mapping keeps the set of conflicts it belongs
//! to; each conflict keeps its member mappings. Neither side owns the other.
//!
//! ## Keeping both sides in step
//!
//! Every change to a mapping/conflict edge goes through `link` and `unlink`,
//! which always update the mapping side and the conflict side together.
//! The public operations are built from those two routines only:
//!
//! - `add_conflict(mapping, conflict)` and `add_mapping(conflict, mapping)`
//!   are the same operation seen from either end. Both require a loaded
//!   mapping and a conflict on exactly the mapping's repository path.
//! - Adding a mapping evicts an earlier member from the same package, so the
//!   most recently added mapping of a package wins.
//! - Adding a conflict moves the mapping out of any other conflict on the
//!   same repository path.
//! - When a removal leaves a conflict with fewer than two members, the
//!   conflict is resolved: the remaining member is detached as well.
//!
//! The overlay never creates or discards a conflict on its own initiative;
//! that is left to the caller (`create_conflict`, `discard_conflict`,
//! `prune_resolved`) or to the explicit `detect_conflicts` pass.

use crate::conflict::PathConflict;
use crate::error::{Error, Result};
use crate::filesystem::Filesystem;
use crate::mapping::{MappingFields, PathMapping};
use crate::package::{Package, PackageRegistry};
use log::{debug, info, trace};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Handle to a mapping owned by an [`Overlay`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingId(usize);

/// Handle to a conflict owned by an [`Overlay`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictId(usize);

impl MappingId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl ConflictId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mapping#{}", self.0)
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conflict#{}", self.0)
    }
}

/// Arena of mappings and conflicts plus the conflict graph between them.
///
/// Slots are never reused, so a handle to a removed entry stays invalid
/// instead of silently pointing at a newer one.
#[derive(Debug, Default)]
pub struct Overlay {
    mappings: Vec<Option<PathMapping>>,
    conflicts: Vec<Option<PathConflict>>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Mappings
    // ========================================================================

    /// Take ownership of a mapping and return its handle
    pub fn insert_mapping(&mut self, mapping: PathMapping) -> MappingId {
        let id = MappingId(self.mappings.len());
        self.mappings.push(Some(mapping));
        id
    }

    /// Remove a mapping from the overlay, unloading it first if needed.
    pub fn remove_mapping_entry(&mut self, id: MappingId) -> Result<PathMapping> {
        if self.mapping(id)?.is_loaded() {
            self.unload(id)?;
        }
        self.mappings[id.0]
            .take()
            .ok_or(Error::UnknownMapping { id: id.0 })
    }

    pub fn mapping(&self, id: MappingId) -> Result<&PathMapping> {
        self.mappings
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownMapping { id: id.0 })
    }

    /// Live mappings in insertion order
    pub fn mappings(&self) -> impl Iterator<Item = (MappingId, &PathMapping)> {
        self.mappings
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|m| (MappingId(i), m)))
    }

    /// Load a mapping against its owning package and the registry.
    pub fn load<F>(
        &mut self,
        id: MappingId,
        package: &Package,
        registry: &PackageRegistry,
        fs: &F,
    ) -> Result<()>
    where
        F: Filesystem + ?Sized,
    {
        self.mapping_mut(id)?.load(package, registry, fs)
    }

    /// Detach a mapping from every conflict and clear its load state.
    pub fn unload(&mut self, id: MappingId) -> Result<()> {
        let mapping = self.mapping(id)?;
        mapping.ensure_loaded()?;

        let conflicts: Vec<ConflictId> = mapping.conflicts().collect();
        for conflict in conflicts {
            self.detach(id, conflict)?;
        }

        self.mapping_mut(id)?.unload()
    }

    /// Handles of loaded mappings whose fields satisfy `predicate`
    pub fn find_mappings<P>(&self, mut predicate: P) -> Vec<MappingId>
    where
        P: FnMut(&MappingFields<'_>) -> bool,
    {
        self.mappings()
            .filter_map(|(id, mapping)| {
                mapping
                    .fields()
                    .ok()
                    .filter(|fields| predicate(fields))
                    .map(|_| id)
            })
            .collect()
    }

    // ========================================================================
    // Conflicts
    // ========================================================================

    /// Register a new, empty conflict for `repository_path`
    pub fn create_conflict(&mut self, repository_path: impl Into<String>) -> Result<ConflictId> {
        let conflict = PathConflict::new(repository_path)?;
        let id = ConflictId(self.conflicts.len());
        self.conflicts.push(Some(conflict));
        Ok(id)
    }

    /// Resolve a conflict and drop it from the overlay.
    pub fn discard_conflict(&mut self, id: ConflictId) -> Result<PathConflict> {
        self.resolve(id)?;
        self.conflicts[id.0]
            .take()
            .ok_or(Error::UnknownConflict { id: id.0 })
    }

    /// Discard every resolved conflict, returning how many were dropped
    pub fn prune_resolved(&mut self) -> usize {
        let mut pruned = 0;
        for slot in &mut self.conflicts {
            if slot.as_ref().is_some_and(PathConflict::is_resolved) {
                *slot = None;
                pruned += 1;
            }
        }
        pruned
    }

    pub fn conflict(&self, id: ConflictId) -> Result<&PathConflict> {
        self.conflicts
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownConflict { id: id.0 })
    }

    /// Live conflicts in creation order
    pub fn conflicts(&self) -> impl Iterator<Item = (ConflictId, &PathConflict)> {
        self.conflicts
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (ConflictId(i), c)))
    }

    /// Add `conflict` to `mapping`'s conflicts (and vice versa).
    ///
    /// Fails with `NotLoaded` for an unloaded mapping and `InvalidArgument`
    /// when the conflict is not on exactly the mapping's repository path.
    /// Adding a conflict the mapping already belongs to does nothing.
    pub fn add_conflict(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<()> {
        self.attach(mapping, conflict)
    }

    /// Add `mapping` to `conflict`; same rules as [`add_conflict`](Self::add_conflict).
    pub fn add_mapping(&mut self, conflict: ConflictId, mapping: MappingId) -> Result<()> {
        self.attach(mapping, conflict)
    }

    /// Remove `conflict` from `mapping`; a no-op if they are not linked.
    pub fn remove_conflict(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<()> {
        self.mapping(mapping)?.ensure_loaded()?;
        self.conflict(conflict)?;
        if self.is_linked(mapping, conflict)? {
            self.detach(mapping, conflict)?;
        }
        Ok(())
    }

    /// Remove `mapping` from `conflict`; same rules as [`remove_conflict`](Self::remove_conflict).
    pub fn remove_mapping(&mut self, conflict: ConflictId, mapping: MappingId) -> Result<()> {
        self.remove_conflict(mapping, conflict)
    }

    /// Detach every member from `conflict`, leaving it resolved.
    pub fn resolve(&mut self, conflict: ConflictId) -> Result<()> {
        let members = self.conflict_mut(conflict)?.take_members();
        for mapping in members {
            if let Some(Some(m)) = self.mappings.get_mut(mapping.0) {
                m.remove_conflict_edge(conflict);
            }
            trace!("Unlinked {} from {}", mapping, conflict);
        }
        debug!("Resolved {}", conflict);
        Ok(())
    }

    // ========================================================================
    // Derived Queries
    // ========================================================================

    /// Names of the other packages that share a conflict with `mapping`
    pub fn conflicting_packages(&self, mapping: MappingId) -> Result<BTreeSet<String>> {
        let own = self
            .mapping(mapping)?
            .containing_package()
            .ok()
            .map(|p| p.name().to_string());

        let mut packages = BTreeSet::new();
        for other in self.conflicting_mappings(mapping)? {
            let name = self.mapping(other)?.containing_package()?.name();
            if own.as_deref() != Some(name) {
                packages.insert(name.to_string());
            }
        }
        Ok(packages)
    }

    /// All other mappings that share a conflict with `mapping`, deduplicated
    pub fn conflicting_mappings(&self, mapping: MappingId) -> Result<Vec<MappingId>> {
        let mut seen = BTreeSet::new();
        let mut result = Vec::new();
        for conflict in self.mapping(mapping)?.conflicts() {
            for other in self.conflict(conflict)?.mappings() {
                if other != mapping && seen.insert(other) {
                    result.push(other);
                }
            }
        }
        Ok(result)
    }

    /// Register conflicts for repository paths claimed by several packages.
    ///
    /// Loaded, enabled mappings are grouped by repository path. Every path
    /// claimed by two or more packages gets a conflict (an existing live one
    /// for that path is reused) and all claimants are added to it. Returns
    /// the unresolved conflicts ordered by repository path.
    pub fn detect_conflicts(&mut self) -> Result<Vec<ConflictId>> {
        let mut claims: BTreeMap<String, Vec<MappingId>> = BTreeMap::new();
        for (id, mapping) in self.mappings() {
            if mapping.is_enabled() {
                claims
                    .entry(mapping.repository_path().to_string())
                    .or_default()
                    .push(id);
            }
        }

        let mut detected = Vec::new();
        for (repository_path, claimants) in claims {
            let mut packages = BTreeSet::new();
            for &id in &claimants {
                packages.insert(self.mapping(id)?.containing_package()?.name().to_string());
            }
            if packages.len() < 2 {
                continue;
            }

            let conflict = match self.conflict_for_path(&repository_path) {
                Some(existing) => existing,
                None => self.create_conflict(repository_path.as_str())?,
            };
            for id in claimants {
                self.add_mapping(conflict, id)?;
            }

            info!(
                "Conflict on {} between {} packages",
                repository_path,
                packages.len()
            );
            if !self.conflict(conflict)?.is_resolved() {
                detected.push(conflict);
            }
        }

        Ok(detected)
    }

    /// The live conflict registered for `repository_path`, if any
    pub fn conflict_for_path(&self, repository_path: &str) -> Option<ConflictId> {
        self.conflicts()
            .find(|(_, c)| c.repository_path() == repository_path)
            .map(|(id, _)| id)
    }

    // ========================================================================
    // Edge Maintenance
    // ========================================================================

    fn attach(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<()> {
        let m = self.mapping(mapping)?;
        m.ensure_loaded()?;
        let c = self.conflict(conflict)?;

        if c.repository_path() != m.repository_path() {
            return Err(Error::InvalidArgument {
                message: format!(
                    "The conflict path {} does not match the mapping path {}.",
                    c.repository_path(),
                    m.repository_path()
                ),
            });
        }

        if m.has_conflict(conflict) {
            return Ok(());
        }

        // A mapping belongs to at most one conflict per repository path.
        let previous: Vec<ConflictId> = m
            .conflicts()
            .filter(|&other| {
                self.conflict(other)
                    .map(|o| o.repository_path() == c.repository_path())
                    .unwrap_or(false)
            })
            .collect();
        for other in previous {
            self.detach(mapping, other)?;
        }

        self.link(mapping, conflict)
    }

    /// Add the edge on both sides, evicting an earlier member of the same package
    fn link(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<()> {
        let package = self
            .mapping(mapping)?
            .containing_package()?
            .name()
            .to_string();

        let previous = self.conflict(conflict)?.member_for_package(&package);
        if let Some(previous) = previous.filter(|&p| p != mapping) {
            self.unlink(previous, conflict)?;
        }

        self.conflict_mut(conflict)?.insert_member(&package, mapping);
        self.mapping_mut(mapping)?.insert_conflict(conflict);
        trace!("Linked {} ({}) to {}", mapping, package, conflict);
        Ok(())
    }

    /// Remove the edge on both sides
    fn unlink(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<()> {
        self.conflict_mut(conflict)?.remove_member(mapping);
        self.mapping_mut(mapping)?.remove_conflict_edge(conflict);
        trace!("Unlinked {} from {}", mapping, conflict);
        Ok(())
    }

    /// Unlink, then resolve the conflict if fewer than two members remain
    fn detach(&mut self, mapping: MappingId, conflict: ConflictId) -> Result<()> {
        self.unlink(mapping, conflict)?;
        if self.conflict(conflict)?.len() < 2 {
            self.resolve(conflict)?;
        }
        Ok(())
    }

    fn is_linked(&self, mapping: MappingId, conflict: ConflictId) -> Result<bool> {
        Ok(self.mapping(mapping)?.has_conflict(conflict))
    }

    fn mapping_mut(&mut self, id: MappingId) -> Result<&mut PathMapping> {
        self.mappings
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownMapping { id: id.0 })
    }

    fn conflict_mut(&mut self, id: ConflictId) -> Result<&mut PathConflict> {
        self.conflicts
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownConflict { id: id.0 })
    }
}
