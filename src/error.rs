//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for `pjgen`.
//! It uses the `thiserror` library to create a single `Error` enum that covers
//! every anticipated failure mode, and an `ErrorCollection` that accumulates
//! errors across a run instead of aborting on the first one.
//!
//! ## Key Components
//!
//! - **`Error`**: Every failure the engine can report. Variants carry enough
//!   context (file path, job name, field name) to be actionable on their own.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! - **`ErrorCollection`**: An ordered list of errors recorded while the
//!   pipeline keeps going. Each entry may be tagged with the unit of work it
//!   belongs to (an input file, a job, a destination).
//!
//! ## Error Taxonomy
//!
//! - Setup errors (for example an output path that cannot be made absolute)
//!   are returned directly and abort the run.
//! - Per-source, per-job and per-destination errors are pushed onto an
//!   `ErrorCollection` and surfaced once at the end of the run.

use std::fmt;

use thiserror::Error;

/// Main error type for pjgen operations
#[derive(Error, Debug)]
pub enum Error {
    /// A repository identifier did not have the `org/repo` shape.
    #[error("Invalid repository identifier '{value}': expected 'org/repo'")]
    InvalidOrgRepo { value: String },

    /// An extra repository reference did not have the `org/repo[@branch]` shape.
    #[error("Invalid extra repository '{value}': expected 'org/repo[@branch]'")]
    InvalidExtraRepo { value: String },

    /// A job referenced a requirement that its document does not declare.
    #[error("Unknown requirement '{name}' for job '{job}'")]
    UnknownRequirement { job: String, name: String },

    /// A job type string did not name a known job type.
    #[error("Unknown job type '{value}' (expected presubmit, postsubmit or periodic)")]
    UnknownJobType { value: String },

    /// A modifier string did not name a known modifier.
    #[error("Unknown modifier '{value}' (expected skipped, optional, hidden or private)")]
    UnknownModifier { value: String },

    /// Two values of incompatible shapes met during a merge.
    #[error("Merge operation error: {field} - {message}")]
    Merge { field: String, message: String },

    /// A template could not be evaluated.
    ///
    /// May include the name of the problematic variable when applicable.
    #[error("Template processing error: {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        message: String,
        /// The template variable that caused the error, if applicable
        variable: Option<String>,
    },

    /// A job document could not be parsed.
    #[error("Document parsing error in {path}: {message}")]
    DocumentParse { path: String, message: String },

    /// A document or global file exists but could not be read.
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    /// An input file or directory does not exist.
    #[error("Input not found: {path}")]
    InputNotFound { path: String },

    /// A destination could not be rendered or written.
    #[error("Output error for {path}: {message}")]
    Output { path: String, message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A directory walking error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// One recorded error, optionally tagged with the unit of work it belongs to.
#[derive(Debug)]
pub struct ErrorEntry {
    /// Input file, job or destination the error was raised for.
    pub scope: Option<String>,
    pub error: Error,
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}: {}", scope, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Errors accumulated over a run that did not stop processing.
#[derive(Debug, Default)]
pub struct ErrorCollection {
    entries: Vec<ErrorEntry>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error with no scope.
    pub fn push(&mut self, error: Error) {
        self.entries.push(ErrorEntry { scope: None, error });
    }

    /// Record an error raised while working on `scope`.
    pub fn push_scoped(&mut self, scope: impl Into<String>, error: Error) {
        self.entries.push(ErrorEntry {
            scope: Some(scope.into()),
            error,
        });
    }

    /// Move every entry of `other` into this collection, tagging unscoped
    /// entries with `scope`.
    pub fn extend_scoped(&mut self, scope: &str, other: ErrorCollection) {
        for mut entry in other.entries {
            if entry.scope.is_none() {
                entry.scope = Some(scope.to_string());
            }
            self.entries.push(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter()
    }

    /// `Ok(())` when nothing was recorded, otherwise the collection itself.
    pub fn into_result(self) -> std::result::Result<(), ErrorCollection> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.entries.len() == 1 { "error" } else { "errors" };
        write!(f, "{} {} occurred:", self.entries.len(), noun)?;
        for (idx, entry) in self.entries.iter().enumerate() {
            write!(f, "\n  {}. {}", idx + 1, entry)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorCollection {}
