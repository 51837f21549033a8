//! Shared test utilities for integration and E2E tests.
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
//!     let fixture = TestFixture::new().with_file("jobs.yaml", documents::WIDGET);
//!     fixture.command().arg("create").arg("-i").arg("jobs.yaml").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::documents;
    #[allow(unused_imports)]
    pub use super::parse_output;
    pub use super::TestFixture;
}

/// Job documents used across tests.
#[allow(dead_code)]
pub mod documents {
    /// A global file contributing only an image.
    pub const GLOBAL_IMAGE: &str = r#"
global_defaults:
  image: base:latest
"#;

    /// One lint job for acme/widget with local branch defaults.
    pub const WIDGET: &str = r#"
defaults:
  branches: [main]
jobs:
  - name: lint
    repo: acme/widget
    command: [make, lint]
"#;

    /// Jobs routed to per-repository files by `output_tmpl`.
    pub const ROUTED: &str = r#"
defaults:
  output_tmpl: "{{ .Org }}/{{ .Repo }}"
jobs:
  - name: unit
    repo: acme/widget
    types: [presubmit, postsubmit]
  - name: unit
    repo: acme/gadget
  - name: nightly
    repo: acme/widget
    types: [periodic]
    cron: "0 3 * * *"
"#;

    /// A document with one valid job and one with a bad repository.
    pub const PARTIALLY_BROKEN: &str = r#"
jobs:
  - name: good
    repo: acme/widget
  - name: bad
    repo: widget
"#;

    /// Jobs sharing requirement fragments.
    pub const WITH_REQUIREMENTS: &str = r#"
defaults:
  requirements:
    docker:
      volumes:
        - name: docker
          emptyDir: {}
      volume_mounts:
        - name: docker
          mountPath: /var/lib/docker
      labels:
        preset-docker: "true"
    gpu:
      node_selector:
        accelerator: nvidia
jobs:
  - name: build
    repo: acme/widget
    require: [docker, gpu]
"#;

    /// Not YAML.
    pub const INVALID_YAML: &str = "jobs: [unclosed";
}

/// Parse generated output, checking the generated-file header.
#[allow(dead_code)]
pub fn parse_output(content: &str) -> serde_yaml::Value {
    assert!(
        content.starts_with("# Code generated by pjgen. DO NOT EDIT."),
        "missing generated header in:\n{}",
        content
    );
    serde_yaml::from_str(content).expect("generated output should be valid YAML")
}

/// A temporary directory populated with job documents.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
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

    /// Absolute path of a file in the fixture.
    #[allow(dead_code)]
    pub fn join(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Read a file from the fixture.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.join(path))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e))
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory, with the
    /// environment cleared of settings that would change its behavior.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pjgen");
        cmd.current_dir(self.path())
            .env_remove("PJGEN_GLOBAL")
            .env_remove("PJGEN_INPUT")
            .env_remove("PJGEN_OUTPUT")
            .env_remove("PJGEN_SORT")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("nested/jobs.yaml", "jobs: []");
        assert!(fixture.join("nested/jobs.yaml").exists());
    }

    #[test]
    fn test_documents_are_valid_yaml() {
        let docs = [
            documents::GLOBAL_IMAGE,
            documents::WIDGET,
            documents::ROUTED,
            documents::PARTIALLY_BROKEN,
            documents::WITH_REQUIREMENTS,
        ];

        for doc in docs {
            serde_yaml::from_str::<serde_yaml::Value>(doc).expect("Document should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(documents::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
