//! # Output Configuration
//!
//! Controls how the CLI renders mapping states and status markers.
//!
//! Colors follow the `--color=always|never|auto` flag. In auto mode they are
//! turned off by `NO_COLOR` (any value), `CLICOLOR=0` or `TERM=dumb`, forced
//! on by `CLICOLOR_FORCE=1`, and otherwise follow the terminal's support.

use crate::mapping::MappingState;
use console::style;
use std::env;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color` flag.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Render a mapping state, colored when enabled
    pub fn state_label(&self, state: MappingState) -> String {
        self.state_column(state, 0)
    }

    /// Render a mapping state padded to `width` visible columns
    pub fn state_column(&self, state: MappingState, width: usize) -> String {
        let label = format!("{:<width$}", state.to_string(), width = width);
        if !self.use_color {
            return label;
        }
        match state {
            MappingState::Enabled => style(label).force_styling(true).green().to_string(),
            MappingState::NotFound => style(label).force_styling(true).yellow().to_string(),
            MappingState::Conflict => style(label).force_styling(true).red().bold().to_string(),
        }
    }

    /// Render an error marker for problem listings
    pub fn error_marker(&self) -> String {
        if self.use_color {
            style("error:").force_styling(true).red().bold().to_string()
        } else {
            "error:".to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
