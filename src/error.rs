//! # Error Handling
//!
//! This module defines the centralized error handling for `repo-overlay`.
//! It uses the `thiserror` library to build an `Error` enum covering every
//! hard failure, plus a separate `LoadError` record type for the failures
//! that are *data* rather than control flow.
//!
//! ## Key Components
//!
//! - **`Error`**: Hard failures returned to the caller. These are either
//!   caller bugs (bad constructor input, loading a mapping twice, touching
//!   an unloaded mapping, stale handles) or ambient failures (I/O while
//!   walking a tree, malformed manifest).
//!
//! - **`LoadError`**: A reference that could not be resolved during
//!   `load()`. These are collected on the mapping and never abort a load.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for repo-overlay operations
#[derive(Error, Debug)]
pub enum Error {
    /// An argument passed to a constructor or operation was rejected.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// `load()` was called on a mapping that is already loaded.
    #[error("The mapping for {repository_path} is already loaded")]
    AlreadyLoaded { repository_path: String },

    /// An operation that needs a loaded mapping was called before `load()`.
    #[error("The mapping for {repository_path} is not loaded")]
    NotLoaded { repository_path: String },

    /// A package lookup in the registry failed.
    #[error("The package \"{name}\" does not exist")]
    PackageNotFound { name: String },

    /// Two packages with the same name were added to a registry.
    #[error("The package \"{name}\" is already registered")]
    DuplicatePackage { name: String },

    /// A mapping handle does not refer to a live mapping.
    #[error("Unknown mapping handle: {id}")]
    UnknownMapping { id: usize },

    /// A conflict handle does not refer to a live conflict.
    #[error("Unknown conflict handle: {id}")]
    UnknownConflict { id: usize },

    /// An error occurred while parsing the overlay manifest.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// A path reference that failed to resolve while loading a mapping.
///
/// `index` is the position of the offending reference in the mapping's
/// declared reference list, so errors can be lined up with their source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The reference names a package the registry does not know.
    #[error("Reference \"{reference}\" names the unknown package \"{name}\"")]
    PackageNotFound {
        index: usize,
        reference: String,
        name: String,
    },

    /// The reference resolved to a path that does not exist.
    #[error("The path {} mapped to {repository_path} by package \"{package}\" does not exist", path.display())]
    PathNotFound {
        index: usize,
        reference: String,
        path: PathBuf,
        repository_path: String,
        package: String,
    },
}

impl LoadError {
    /// Position of the failed reference in the declared reference list.
    pub fn index(&self) -> usize {
        match self {
            LoadError::PackageNotFound { index, .. } | LoadError::PathNotFound { index, .. } => {
                *index
            }
        }
    }

    /// The raw reference string as declared.
    pub fn reference(&self) -> &str {
        match self {
            LoadError::PackageNotFound { reference, .. }
            | LoadError::PathNotFound { reference, .. } => reference,
        }
    }

    pub fn is_package_not_found(&self) -> bool {
        matches!(self, LoadError::PackageNotFound { .. })
    }

    pub fn is_path_not_found(&self) -> bool {
        matches!(self, LoadError::PathNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_argument() {
        let error = Error::InvalidArgument {
            message: "The repository path must not be empty.".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid argument"));
        assert!(display.contains("must not be empty"));
    }

    #[test]
    fn test_error_display_already_loaded() {
        let error = Error::AlreadyLoaded {
            repository_path: "/app".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "The mapping for /app is already loaded"
        );
    }

    #[test]
    fn test_error_display_not_loaded() {
        let error = Error::NotLoaded {
            repository_path: "/app".to_string(),
        };
        assert!(format!("{}", error).contains("not loaded"));
    }

    #[test]
    fn test_error_display_package_not_found() {
        let error = Error::PackageNotFound {
            name: "vendor/missing".to_string(),
        };
        assert!(format!("{}", error).contains("\"vendor/missing\" does not exist"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "Unknown package \"foo\"".to_string(),
            hint: Some("Declare it under 'packages:'".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint:"));
        assert!(display.contains("packages:"));
    }

    #[test]
    fn test_error_display_config_parse_without_hint() {
        let error = Error::ConfigParse {
            message: "bad".to_string(),
            hint: None,
        };
        assert!(!format!("{}", error).contains("hint:"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
    }

    #[test]
    fn test_load_error_accessors() {
        let error = LoadError::PackageNotFound {
            index: 2,
            reference: "@foo:res".to_string(),
            name: "foo".to_string(),
        };
        assert_eq!(error.index(), 2);
        assert_eq!(error.reference(), "@foo:res");
        assert!(error.is_package_not_found());
        assert!(!error.is_path_not_found());
    }

    #[test]
    fn test_load_error_display_path_not_found() {
        let error = LoadError::PathNotFound {
            index: 0,
            reference: "foo".to_string(),
            path: PathBuf::from("/pkg/foo"),
            repository_path: "/app".to_string(),
            package: "vendor/pkg".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("/pkg/foo"));
        assert!(display.contains("/app"));
        assert!(display.contains("vendor/pkg"));
        assert!(error.is_path_not_found());
    }
}
