//! # Overlay Manifest Schema and Parsing
//!
//! This module defines the data structures that represent the
//! `.repo-overlay.yaml` manifest and the logic for parsing it. A manifest
//! declares the packages taking part in an overlay, the mappings each package
//! contributes, and a few options for walking the filesystem.
//!
//! ```yaml
//! options:
//!   follow_links: false
//! packages:
//!   - name: vendor/package1
//!     path: packages/package1
//! mappings:
//!   - package: vendor/package1
//!     path: /app
//!     references: [resources, "@vendor/package2:assets"]
//! ```
//!
//! Package paths may be relative; they are resolved against the directory
//! holding the manifest when the overlay is built, not here.

use crate::error::{Error, Result};
use crate::filesystem::WalkOptions;
use crate::mapping::References;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The whole manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
}

/// Filesystem walking options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Follow symbolic links while expanding trees
    #[serde(default)]
    pub follow_links: bool,
}

impl Options {
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            follow_links: self.follow_links,
        }
    }
}

/// A package taking part in the overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Unique package name (e.g., "vendor/package1")
    pub name: String,
    /// Base directory, absolute or relative to the manifest
    pub path: PathBuf,
}

/// A mapping contributed by a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Name of the package that owns the mapping
    pub package: String,
    /// Repository path the mapping contributes
    pub path: String,
    /// One reference or a list of references, in priority order
    pub references: References,
}

/// Parses a YAML string into an `OverlayConfig` and validates it.
pub fn parse(yaml_content: &str) -> Result<OverlayConfig> {
    let config: OverlayConfig =
        serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some(
                "The manifest needs 'packages:' and 'mappings:' lists; see the crate docs for an example"
                    .to_string(),
            ),
        })?;
    validate(&config)?;
    Ok(config)
}

/// Parse an `OverlayConfig` from a YAML file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<OverlayConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

fn validate(config: &OverlayConfig) -> Result<()> {
    let mut names = HashSet::new();
    for package in &config.packages {
        if package.name.is_empty() {
            return Err(Error::ConfigParse {
                message: "Package name must not be empty".to_string(),
                hint: Some("Give every entry under 'packages:' a 'name:'".to_string()),
            });
        }
        if !names.insert(package.name.as_str()) {
            return Err(Error::ConfigParse {
                message: format!("Package \"{}\" is declared twice", package.name),
                hint: None,
            });
        }
    }

    for mapping in &config.mappings {
        if !names.contains(mapping.package.as_str()) {
            return Err(Error::ConfigParse {
                message: format!(
                    "Mapping for {} names the undeclared package \"{}\"",
                    mapping.path, mapping.package
                ),
                hint: Some(format!(
                    "Declare \"{}\" under 'packages:'",
                    mapping.package
                )),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
options:
  follow_links: true
packages:
  - name: vendor/package1
    path: packages/package1
  - name: vendor/package2
    path: /abs/package2
mappings:
  - package: vendor/package1
    path: /app
    references: resources
  - package: vendor/package2
    path: /app
    references:
      - resources
      - "@vendor/package1:assets"
"#;

    #[test]
    fn test_parse_manifest() {
        let config = parse(MANIFEST).unwrap();
        assert!(config.options.follow_links);
        assert!(config.options.walk_options().follow_links);
        assert_eq!(config.packages.len(), 2);
        assert_eq!(config.packages[0].path, PathBuf::from("packages/package1"));
        assert_eq!(config.mappings.len(), 2);
        assert_eq!(
            config.mappings[0].references,
            References::One("resources".to_string())
        );
        assert_eq!(
            config.mappings[1].references,
            References::Many(vec![
                "resources".to_string(),
                "@vendor/package1:assets".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_defaults() {
        let config = parse("packages: []").unwrap();
        assert!(!config.options.follow_links);
        assert!(config.mappings.is_empty());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse("packages: [unclosed");
        assert!(matches!(result, Err(Error::ConfigParse { hint: Some(_), .. })));
    }

    #[test]
    fn test_parse_rejects_unknown_package() {
        let yaml = r#"
packages:
  - name: vendor/package1
    path: p1
mappings:
  - package: vendor/other
    path: /app
    references: resources
"#;
        match parse(yaml) {
            Err(Error::ConfigParse { message, hint }) => {
                assert!(message.contains("vendor/other"));
                assert!(hint.unwrap().contains("packages:"));
            }
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_duplicate_package() {
        let yaml = r#"
packages:
  - name: vendor/package1
    path: p1
  - name: vendor/package1
    path: p2
"#;
        assert!(matches!(parse(yaml), Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_rejects_empty_package_name() {
        let yaml = r#"
packages:
  - name: ""
    path: p1
"#;
        assert!(matches!(parse(yaml), Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(".repo-overlay.yaml");
        std::fs::write(&path, MANIFEST).unwrap();
        assert_eq!(from_file(&path).unwrap().packages.len(), 2);
    }

    #[test]
    fn test_from_file_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            from_file(temp.path().join("missing.yaml")),
            Err(Error::Io(_))
        ));
    }
}
