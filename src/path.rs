//! Path manipulation utilities for repo-overlay
//!
//! Two kinds of paths meet here. Path references are the strings a mapping
//! declares (`resources`, `@vendor/package2:resources`). Repository paths are
//! `/`-separated logical paths in the merged namespace.

use crate::error::{Error, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};

/// A parsed path reference.
///
/// A reference is either local to the package that owns the mapping, or
/// points into another package with the form `@<package-name>:<relative-path>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathReference<'a> {
    /// Relative to the owning package's base directory.
    Local { path: &'a str },
    /// Relative to the named package's base directory.
    Package { package: &'a str, path: &'a str },
}

impl<'a> PathReference<'a> {
    /// Parse a raw reference string.
    ///
    /// Anything that does not have a non-empty package name and a non-empty
    /// path around the first `:` after a leading `@` is treated as local.
    /// Malformed forms such as `@pkg:` or `@:res` therefore fall back to local
    /// paths and surface as a missing path when loaded.
    pub fn parse(reference: &'a str) -> Self {
        match reference.strip_prefix('@').and_then(|rest| rest.split_once(':')) {
            Some((package, path)) if !package.is_empty() && !path.is_empty() => {
                PathReference::Package { package, path }
            }
            _ => PathReference::Local { path: reference },
        }
    }

    /// The path part, relative to whichever package it resolves against
    pub fn relative_path(&self) -> &'a str {
        match self {
            PathReference::Local { path } | PathReference::Package { path, .. } => path,
        }
    }

    /// The referenced package, if the reference crosses packages
    pub fn package(&self) -> Option<&'a str> {
        match self {
            PathReference::Local { .. } => None,
            PathReference::Package { package, .. } => Some(package),
        }
    }
}

/// Join a repository path with a relative subpath.
///
/// An empty subpath yields the repository path unchanged. A trailing `/` on
/// the base is not doubled, so the root `/` joins to `/css` rather than `//css`.
pub fn join_repository_path(base: &str, subpath: &str) -> String {
    if subpath.is_empty() {
        return base.to_string();
    }

    format!("{}/{}", base.trim_end_matches('/'), subpath)
}

/// Join a reference's path part onto a package base directory.
///
/// Leading separators are dropped so the result always stays under `base`.
pub fn package_path(base: &Path, relative: &str) -> PathBuf {
    base.join(relative.trim_start_matches(['/', '\\']))
}

/// Compile a glob pattern over repository paths
pub fn compile_glob(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(Error::Glob)
}

/// Match a path against a glob pattern
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    Ok(compile_glob(pattern)?.matches(path))
}
