//! Default values for pjgen.
//!
//! This module provides centralized default values used across the engine
//! and the commands, ensuring consistency and avoiding duplication.

/// Branch checked out for an extra repository that does not name one.
///
/// This is independent of whatever branch the primary repository uses.
pub const DEFAULT_BRANCH: &str = "master";

/// File name used for a destination when a job has no output template.
pub const DEFAULT_OUTPUT_FILE: &str = "prowjobs.yaml";

/// Extension appended to templated output paths that lack a yaml extension.
pub const DEFAULT_EXTENSION: &str = "yaml";

/// Marker written at the top of every generated document.
pub const GENERATED_HEADER: &str = "# Code generated by pjgen. DO NOT EDIT.";

/// Pattern matched against a file extension (without the dot).
pub const YAML_EXTENSION_PATTERN: &str = r"(?i)^ya?ml$";
