//! # Packages and the Package Registry
//!
//! A `Package` pairs a unique name with the directory its files live in.
//! The `PackageRegistry` is the ordered, name-keyed collection that mappings
//! resolve cross-package references against. Both are read-only once built:
//! the registry is assembled up front (usually by the orchestrator from the
//! overlay manifest) and then passed explicitly into every `load()`.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// A named package and its base directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Package {
    name: String,
    base_dir: PathBuf,
}

impl Package {
    /// Creates a package. The name must not be empty.
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidArgument {
                message: "The package name must not be empty.".to_string(),
            });
        }

        Ok(Self {
            name,
            base_dir: base_dir.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory that local path references are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Ordered collection of packages keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: IndexMap<String, Package>,
}

impl PackageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from packages in order, rejecting duplicate names.
    pub fn from_packages<I>(packages: I) -> Result<Self>
    where
        I: IntoIterator<Item = Package>,
    {
        let mut registry = Self::new();
        for package in packages {
            registry.add(package)?;
        }
        Ok(registry)
    }

    /// Add a package; names must be unique within the registry.
    pub fn add(&mut self, package: Package) -> Result<()> {
        if self.packages.contains_key(package.name()) {
            return Err(Error::DuplicatePackage {
                name: package.name().to_string(),
            });
        }
        self.packages.insert(package.name().to_string(), package);
        Ok(())
    }

    /// Looks up a package by name.
    ///
    /// Fails with `Error::PackageNotFound` rather than returning `None`, so a
    /// missing package is always reported with its name.
    pub fn lookup(&self, name: &str) -> Result<&Package> {
        self.packages
            .get(name)
            .ok_or_else(|| Error::PackageNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Package names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Iterate over packages in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }
}
