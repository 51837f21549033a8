//! # Pipeline
//!
//! Drives a full generation run:
//!
//! 1.  **Setup**: Resolve every path given on the command line to an
//!     absolute path and classify the output target. Failures here abort
//!     the run.
//! 2.  **Baseline**: Fold the `global_defaults` of every global file into one
//!     baseline job, earlier files taking precedence.
//! 3.  **Loading**: Expand inputs (walking directories for yaml files) and
//!     read and parse the documents in parallel.
//! 4.  **Resolution**: For each job, in document order, merge the document
//!     `defaults`, the document `global_defaults` and the baseline, then
//!     apply its requirements.
//! 5.  **Materialization**: Validate the job, resolve its destination and
//!     turn it into typed records added to the [`Aggregator`].
//! 6.  **Sorting**: Sort every destination's records by name.
//! 7.  **Writing**: Render each non-empty destination with a generated-file
//!     header and write it ([`Report::write`]).
//!
//! Only step 1 can fail the run. Every other failure is recorded in the
//! report's [`ErrorCollection`] and only the affected file, job or
//! destination is skipped.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use log::{debug, info, warn};
use rayon::prelude::*;
use regex::Regex;

use crate::aggregate::{Aggregator, Destination, SortOrder};
use crate::defaults::{DEFAULT_OUTPUT_FILE, GENERATED_HEADER};
use crate::error::{Error, ErrorCollection, Result};
use crate::job::{Job, JobDocument};
use crate::materialize::{materialize, ResolvedJob};
use crate::merge::Merge;
use crate::path::{self, OutputTarget};
use crate::records::JobConfig;
use crate::requirements;
use crate::template;

/// A source of job documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    Path(PathBuf),
}

impl Input {
    /// Interpret a command-line value; `-` is standard input.
    pub fn from_arg(value: PathBuf) -> Self {
        if value.as_os_str() == "-" {
            Input::Stdin
        } else {
            Input::Path(value)
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => f.write_str("<stdin>"),
            Input::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Options for a run, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Files whose `global_defaults` form the baseline.
    pub globals: Vec<PathBuf>,
    /// Files or directories to read jobs from. Empty means standard input.
    pub inputs: Vec<Input>,
    /// Output file or directory. `None` means standard output.
    pub output: Option<PathBuf>,
    pub sort: SortOrder,
}

/// A configured run.
#[derive(Debug)]
pub struct Pipeline {
    globals: Vec<PathBuf>,
    inputs: Vec<Input>,
    output: OutputTarget,
    sort: SortOrder,
    extension: Regex,
}

/// The outcome of a run: the aggregated records plus every error recorded
/// along the way.
#[derive(Debug, Default)]
pub struct Report {
    pub aggregator: Aggregator,
    pub errors: ErrorCollection,
}

impl Pipeline {
    /// Resolve paths and classify the output target.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        let extension = path::yaml_extension()?;

        let globals = options
            .globals
            .iter()
            .map(|p| path::absolute(p))
            .collect::<Result<Vec<_>>>()?;

        let mut inputs = options
            .inputs
            .into_iter()
            .map(|input| match input {
                Input::Path(p) => path::absolute(&p).map(Input::Path),
                Input::Stdin => Ok(Input::Stdin),
            })
            .collect::<Result<Vec<_>>>()?;
        if inputs.is_empty() {
            inputs.push(Input::Stdin);
        }
        // Standard input can only be consumed once.
        let mut seen_stdin = false;
        inputs.retain(|input| match input {
            Input::Stdin => !std::mem::replace(&mut seen_stdin, true),
            Input::Path(_) => true,
        });

        let output = OutputTarget::classify(options.output.as_deref(), &extension)?;

        Ok(Self {
            globals,
            inputs,
            output,
            sort: options.sort,
            extension,
        })
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    /// Run every stage except writing.
    pub fn run(&self) -> Report {
        let mut errors = ErrorCollection::new();
        let baseline = self.load_baseline(&mut errors);

        let sources = self.sources(&mut errors);
        let documents: Vec<(String, Result<JobDocument>)> = sources
            .par_iter()
            .map(|source| (source.to_string(), read_document(source)))
            .collect();

        let mut aggregator = Aggregator::new();
        for (label, document) in documents {
            match document {
                Ok(document) => {
                    self.process_document(&label, &document, &baseline, &mut aggregator, &mut errors)
                }
                Err(e) => errors.push(e),
            }
        }

        aggregator.sort(self.sort);
        Report { aggregator, errors }
    }

    /// Fold the `global_defaults` of every global file into one job.
    pub fn load_baseline(&self, errors: &mut ErrorCollection) -> Job {
        let mut baseline = Job::default();

        for path in &self.globals {
            let source = Input::Path(path.clone());
            if !path.exists() {
                errors.push(Error::InputNotFound {
                    path: path.display().to_string(),
                });
                continue;
            }

            let document = match read_document(&source) {
                Ok(document) => document,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            if !document.jobs.is_empty() || document.defaults != Job::default() {
                warn!(
                    "Ignoring 'jobs' and 'defaults' in global file {}",
                    path.display()
                );
            }

            debug!("Merging global defaults from {}", path.display());
            if let Err(e) = baseline.merge_from(&document.global_defaults) {
                errors.push_scoped(source.to_string(), e);
            }
        }

        baseline
    }

    /// Expand inputs into the individual documents to read.
    fn sources(&self, errors: &mut ErrorCollection) -> Vec<Input> {
        let mut sources = Vec::new();
        for input in &self.inputs {
            match input {
                Input::Stdin => sources.push(Input::Stdin),
                Input::Path(path) => sources.extend(
                    path::collect_inputs(path, &self.extension, errors)
                        .into_iter()
                        .map(Input::Path),
                ),
            }
        }
        sources
    }

    fn process_document(
        &self,
        label: &str,
        document: &JobDocument,
        baseline: &Job,
        aggregator: &mut Aggregator,
        errors: &mut ErrorCollection,
    ) {
        debug!("Processing {} ({} jobs)", label, document.jobs.len());

        for (index, job) in document.jobs().enumerate() {
            let scope = format!("{}: {}", label, document.job_label(index));

            let mut job = match job {
                Ok(job) => job,
                Err(e) => {
                    errors.push_scoped(&scope, e);
                    continue;
                }
            };

            for layer in [&document.defaults, &document.global_defaults, baseline] {
                if let Err(e) = job.merge_from(layer) {
                    errors.push_scoped(&scope, e);
                }
            }
            errors.extend_scoped(&scope, requirements::apply(&mut job));

            let mut warnings = ErrorCollection::new();
            let resolved = match ResolvedJob::new(job, &mut warnings) {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!("Skipping {}: {}", scope, e);
                    errors.push_scoped(&scope, e);
                    errors.extend_scoped(&scope, warnings);
                    continue;
                }
            };

            let destination = self.destination(&resolved, &mut warnings);
            errors.extend_scoped(&scope, warnings);

            let org_repo = resolved.org_repo.to_string();
            for record in materialize(&resolved) {
                aggregator.add(&destination, &org_repo, record);
            }
        }
    }

    /// Where the records of `resolved` are written.
    pub fn destination(&self, resolved: &ResolvedJob, warnings: &mut ErrorCollection) -> Destination {
        match &self.output {
            OutputTarget::Stdout => Destination::Stdout,
            OutputTarget::File(file) => Destination::File(file.clone()),
            OutputTarget::Directory(dir) => {
                let relative =
                    template::resolve(&resolved.job.output_tmpl, &resolved.vars(), warnings);
                let relative = relative.trim_start_matches('/');
                if relative.is_empty() {
                    return Destination::File(dir.join(DEFAULT_OUTPUT_FILE));
                }
                Destination::File(path::with_yaml_extension(
                    dir.join(relative),
                    &self.extension,
                ))
            }
        }
    }
}

fn read_document(source: &Input) -> Result<JobDocument> {
    let content = match source {
        Input::Stdin => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content).map(|_| content)
        }
        Input::Path(path) => fs::read_to_string(path),
    }
    .map_err(|e| Error::Read {
        path: source.to_string(),
        message: e.to_string(),
    })?;

    JobDocument::parse(&content).map_err(|e| Error::DocumentParse {
        path: source.to_string(),
        message: e.to_string(),
    })
}

/// Render one destination's document.
pub fn render(config: &JobConfig) -> Result<String> {
    let body = serde_yaml::to_string(config)?;
    Ok(format!("{}\n{}", GENERATED_HEADER, body))
}

fn write_destination(
    destination: &Destination,
    config: &JobConfig,
    stdout: &mut dyn Write,
) -> Result<()> {
    let output_error = |message: String| Error::Output {
        path: destination.to_string(),
        message,
    };

    let rendered = render(config).map_err(|e| output_error(e.to_string()))?;

    match destination {
        Destination::Stdout => stdout
            .write_all(rendered.as_bytes())
            .map_err(|e| output_error(e.to_string())),
        Destination::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    output_error(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            fs::write(path, rendered)
                .map_err(|e| output_error(format!("Failed to write file: {}", e)))
        }
    }
}

impl Report {
    /// Write every non-empty destination. Standard output destinations go
    /// to `stdout`. Returns the destinations written.
    pub fn write(&mut self, stdout: &mut dyn Write) -> Vec<Destination> {
        let mut written = Vec::new();

        for (destination, config) in self.aggregator.non_empty() {
            match write_destination(destination, config, stdout) {
                Ok(()) => {
                    info!("Wrote {}", destination);
                    written.push(destination.clone());
                }
                Err(e) => self.errors.push(e),
            }
        }

        written
    }

    /// Number of (presubmit, postsubmit, periodic) records across all
    /// destinations.
    pub fn record_counts(&self) -> (usize, usize, usize) {
        self.aggregator
            .non_empty()
            .fold((0, 0, 0), |(pre, post, periodic), (_, config)| {
                (
                    pre + config.presubmit_count(),
                    post + config.postsubmit_count(),
                    periodic + config.periodic_count(),
                )
            })
    }
}
