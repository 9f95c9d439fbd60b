//! Shared test utilities for integration and E2E tests.
//!
//! This module provides on-disk package fixtures and manifest snippets to
//! reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_packages().with_config(configs::CONFLICTING);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Files laid out by [`TestFixture::with_packages`], relative to the fixture root.
pub const PACKAGE_FILES: &[&str] = &[
    "package1/resources/css/style.css",
    "package1/resources/css/style.css.map",
    "package1/assets/css/style.css",
    "package1/assets/js/script.js",
    "package2/resources/css/style.css",
    "package2/resources/images/logo.png",
    "package3/resources/css/style.css",
];

/// Common manifest snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// One package mapping one directory, no problems.
    pub const SINGLE: &str = r#"
packages:
  - name: vendor/package1
    path: package1
mappings:
  - package: vendor/package1
    path: /app
    references: resources
"#;

    /// Two packages claiming `/app`, plus a clean `/img` mapping.
    pub const CONFLICTING: &str = r#"
packages:
  - name: vendor/package1
    path: package1
  - name: vendor/package2
    path: package2
mappings:
  - package: vendor/package1
    path: /app
    references: [resources, assets]
  - package: vendor/package2
    path: /app
    references: resources
  - package: vendor/package2
    path: /img
    references: "@vendor/package1:assets"
"#;

    /// Mappings with a missing path and a missing package.
    pub const BROKEN_REFERENCES: &str = r#"
packages:
  - name: vendor/package1
    path: package1
mappings:
  - package: vendor/package1
    path: /app
    references: [resources, missing, "@vendor/ghost:resources"]
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "packages: [unclosed";
}

/// A test fixture that provides a temporary directory holding package trees
/// and an optional `.repo-overlay.yaml` manifest.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_packages().with_config(configs::SINGLE);
///
/// fixture.command().arg("ls").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.repo-overlay.yaml` manifest with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".repo-overlay.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Lay out the three standard packages listed in [`PACKAGE_FILES`].
    pub fn with_packages(self) -> Self {
        for file in PACKAGE_FILES {
            self.temp_dir
                .child(file)
                .write_str(file)
                .expect("Failed to write package file");
        }
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the manifest.
    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join(".repo-overlay.yaml")
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("repo-overlay").expect("binary not built");
        cmd.current_dir(self.path()).env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
