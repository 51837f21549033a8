//! # Terminal Output
//!
//! Status lines printed by the `pjgen` commands. These go to standard error
//! so that generated YAML on standard output stays clean for piping.
//!
//! Color is controlled by the `--color=always|never|auto` flag. In `auto`
//! mode the usual conventions are honoured: `NO_COLOR`, `CLICOLOR=0`,
//! `CLICOLOR_FORCE=1` and `TERM=dumb`, falling back to terminal detection
//! on standard error.

use std::env;

use console::{style, Term};

use crate::error::ErrorCollection;

/// Whether status output uses color and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Build from the `--color` flag value.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // https://no-color.org/: presence alone disables color
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

        Term::stderr().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Prefix for a successful step.
    pub fn ok(&self) -> String {
        if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "[OK]".to_string()
        }
    }

    /// Prefix for a failed step.
    pub fn err(&self) -> String {
        if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "[ERR]".to_string()
        }
    }

    /// Prefix for an informational line.
    pub fn info(&self) -> String {
        if self.use_color {
            style("•").cyan().to_string()
        } else {
            "[INFO]".to_string()
        }
    }

    /// Render every error of `errors` as an indented list, one per line.
    pub fn error_list(&self, errors: &ErrorCollection) -> String {
        errors
            .iter()
            .map(|entry| format!("   {} {}", self.err(), entry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// `emoji` when color is enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji
    } else {
        plain
    }
}
