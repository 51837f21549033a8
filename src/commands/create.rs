//! # Create Command Implementation
//!
//! Runs the full generation pipeline and writes the resulting Prow job
//! configuration. Generated YAML destined for standard output is the only
//! thing written to stdout; the summary and any errors go to stderr.
//!
//! Errors in individual files, jobs or destinations do not stop the run.
//! Everything that could be generated is written, then the errors are listed
//! and the command exits with status 1.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;

use pjgen::aggregate::Destination;
use pjgen::output::{emoji, OutputConfig};
use pjgen::pipeline::Pipeline;

use super::{finish, SourceArgs};

/// Generate Prow job configuration from job definitions
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Suppress the summary; errors are still reported
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `create` command.
pub fn execute(args: CreateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let pipeline = Pipeline::new(args.source.into()).context("Failed to set up generation")?;
    let mut report = pipeline.run();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let written = report.write(&mut handle);
    handle.flush().context("Failed to flush stdout")?;

    if !args.quiet {
        let (presubmits, postsubmits, periodics) = report.record_counts();
        eprintln!(
            "{} Generated {} presubmit(s), {} postsubmit(s), {} periodic(s)",
            out.ok(),
            presubmits,
            postsubmits,
            periodics
        );
        for destination in &written {
            if let Destination::File(path) = destination {
                eprintln!("   {} {}", emoji(&out, "📄", "[FILE]"), path.display());
            }
        }
    }

    finish(&out, &report.errors, "Generation")
}
