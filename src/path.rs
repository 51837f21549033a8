//! Path utilities: input discovery, extension checks and output targets.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use walkdir::WalkDir;

use crate::defaults::{DEFAULT_EXTENSION, YAML_EXTENSION_PATTERN};
use crate::error::{Error, ErrorCollection, Result};

/// Compiled matcher for the recognized input extension.
pub fn yaml_extension() -> Result<Regex> {
    Regex::new(YAML_EXTENSION_PATTERN).map_err(Error::Regex)
}

/// Check whether `path` has an extension matching `pattern`.
pub fn has_extension(path: &Path, pattern: &Regex) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| pattern.is_match(ext))
}

/// Append `.yaml` to `path` unless it already has a yaml extension.
pub fn with_yaml_extension(path: PathBuf, pattern: &Regex) -> PathBuf {
    if has_extension(&path, pattern) {
        return path;
    }
    let mut raw: OsString = path.into_os_string();
    raw.push(".");
    raw.push(DEFAULT_EXTENSION);
    PathBuf::from(raw)
}

/// Resolve `path` against the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::Path {
        message: format!("Cannot resolve absolute path for '{}': {}", path.display(), e),
    })
}

/// Expand one input path into the files to read.
///
/// A file is returned as-is whatever its extension. A directory is walked
/// recursively in file-name order and only files with a yaml extension are
/// kept; anything else is skipped silently. Unreadable entries are recorded
/// in `errors` and the walk continues.
pub fn collect_inputs(path: &Path, pattern: &Regex, errors: &mut ErrorCollection) -> Vec<PathBuf> {
    if !path.exists() {
        errors.push(Error::InputNotFound {
            path: path.display().to_string(),
        });
        return Vec::new();
    }

    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if has_extension(entry.path(), pattern) {
                    files.push(entry.into_path());
                } else {
                    debug!("Skipping non-yaml file {}", entry.path().display());
                }
            }
            Ok(_) => {}
            Err(e) => errors.push_scoped(path.display().to_string(), Error::Walk(e)),
        }
    }
    files
}

/// Where generated documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Everything is written to standard output.
    Stdout,
    /// Everything is written to one file.
    File(PathBuf),
    /// Each job picks a file under this directory.
    Directory(PathBuf),
}

impl OutputTarget {
    /// Classify an `--output` value.
    ///
    /// No value or `-` means standard output. An existing path is a
    /// directory target if it is a directory and a single file otherwise,
    /// whatever its extension. A missing path is a single file when it has a
    /// yaml extension and a directory target when it does not. The path is
    /// made absolute; failing to do so is a setup error.
    pub fn classify(output: Option<&Path>, pattern: &Regex) -> Result<Self> {
        let Some(output) = output.filter(|p| p.as_os_str() != "-") else {
            return Ok(OutputTarget::Stdout);
        };

        let output = absolute(output)?;
        let is_directory = if output.exists() {
            output.is_dir()
        } else {
            !has_extension(&output, pattern)
        };

        if is_directory {
            Ok(OutputTarget::Directory(output))
        } else {
            Ok(OutputTarget::File(output))
        }
    }
}
