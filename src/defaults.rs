//! Default values for repo-overlay configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

/// File name of the overlay manifest looked up in the current directory.
pub const DEFAULT_CONFIG_FILENAME: &str = ".repo-overlay.yaml";

/// Log level used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
