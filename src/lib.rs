//! # pjgen
//!
//! Generates Prow job configuration from compact, layered job definitions.
//! The library backs the `pjgen` command-line tool and can be embedded in
//! other tooling.
//!
//! ## Quick Example
//!
//! ```
//! use pjgen::job::JobDocument;
//! use pjgen::materialize::{materialize, ResolvedJob};
//! use pjgen::merge::Merge;
//! use pjgen::error::ErrorCollection;
//!
//! let document = JobDocument::parse(r#"
//! defaults:
//!   image: golang:1.22
//! jobs:
//!   - name: lint
//!     repo: acme/widget
//!     types: [presubmit, postsubmit]
//! "#).unwrap();
//!
//! let mut job = document.jobs().next().unwrap().unwrap();
//! job.merge_from(&document.defaults).unwrap();
//!
//! let mut warnings = ErrorCollection::new();
//! let resolved = ResolvedJob::new(job, &mut warnings).unwrap();
//! let records = materialize(&resolved);
//! assert_eq!(records.len(), 2);
//! ```
//!
//! ## Core Concepts
//!
//! - **Jobs (`job`)**: The input document model. A job names its
//!   repository, pod settings, triggers, types and modifiers; documents add
//!   `defaults`, `global_defaults` and named `requirements` fragments.
//! - **Merging (`merge`, `requirements`)**: Fill-empty merging of one job
//!   into another. A field is only taken from a lower layer when the job
//!   leaves it empty.
//! - **Templates (`template`)**: `{{ .Org }}`/`{{ .Repo }}` substitution in
//!   clone URIs and output paths.
//! - **Records (`records`, `materialize`)**: Prow's presubmit, postsubmit and
//!   periodic shapes and the conversion of a resolved job into them.
//! - **Aggregation (`aggregate`)**: Grouping of records by output
//!   destination and sorting by name.
//! - **Pipeline (`pipeline`)**: The driver tying all of the above to files on
//!   disk.
//!
//! ## Execution Flow
//!
//! 1.  **Setup**: Resolve paths and classify the output target.
//! 2.  **Baseline**: Fold global default files into a baseline job.
//! 3.  **Loading**: Read and parse input documents in parallel.
//! 4.  **Resolution**: Layer defaults onto each job and apply requirements.
//! 5.  **Materialization**: Produce records and group them by destination.
//! 6.  **Output**: Sort and write each non-empty destination.

pub mod aggregate;
pub mod defaults;
pub mod error;
pub mod job;
pub mod materialize;
pub mod merge;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod records;
pub mod requirements;
pub mod template;

#[cfg(test)]
mod merge_proptest;
