//! Path conflicts
//!
//! A `PathConflict` records that several loaded mappings claim the exact
//! same repository path. It holds at most one member per owning package;
//! membership is keyed by package name in insertion order.
//!
//! Edges between conflicts and mappings are only changed through the
//! [`Overlay`](crate::overlay::Overlay), which updates both sides together.

use crate::error::{Error, Result};
use crate::overlay::MappingId;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct PathConflict {
    repository_path: String,
    /// Owning package name -> member mapping
    mappings: IndexMap<String, MappingId>,
}

impl PathConflict {
    pub fn new(repository_path: impl Into<String>) -> Result<Self> {
        let repository_path = repository_path.into();
        if repository_path.is_empty() {
            return Err(Error::InvalidArgument {
                message: "The repository path of a conflict must not be empty.".to_string(),
            });
        }

        Ok(Self {
            repository_path,
            mappings: IndexMap::new(),
        })
    }

    /// The repository path every member collides on
    pub fn repository_path(&self) -> &str {
        &self.repository_path
    }

    /// Member mappings in the order they joined
    pub fn mappings(&self) -> Vec<MappingId> {
        self.mappings.values().copied().collect()
    }

    /// Names of the packages owning the members
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    pub fn contains(&self, mapping: MappingId) -> bool {
        self.mappings.values().any(|&m| m == mapping)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// A conflict is resolved once it has no members left.
    ///
    /// The overlay empties a conflict as soon as fewer than two members
    /// remain after a removal, so a lone survivor never lingers.
    pub fn is_resolved(&self) -> bool {
        self.mappings.is_empty()
    }

    pub(crate) fn member_for_package(&self, package: &str) -> Option<MappingId> {
        self.mappings.get(package).copied()
    }

    pub(crate) fn insert_member(&mut self, package: &str, mapping: MappingId) {
        self.mappings.insert(package.to_string(), mapping);
    }

    pub(crate) fn remove_member(&mut self, mapping: MappingId) -> bool {
        let before = self.mappings.len();
        self.mappings.retain(|_, &mut m| m != mapping);
        self.mappings.len() != before
    }

    pub(crate) fn take_members(&mut self) -> Vec<MappingId> {
        self.mappings.drain(..).map(|(_, m)| m).collect()
    }
}
