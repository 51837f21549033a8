//! # Validate Command Implementation
//!
//! Runs every stage of the pipeline except writing: documents are parsed,
//! jobs are merged, resolved and materialized, and every destination is
//! rendered in memory. Nothing is written to disk or stdout.
//!
//! This is a safe, read-only operation suitable for CI checks on job
//! definition repositories.

use anyhow::{Context, Result};
use clap::Args;

use pjgen::output::{emoji, OutputConfig};
use pjgen::pipeline::{self, Pipeline};

use super::{finish, SourceArgs};

/// Check job definitions without writing anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let pipeline = Pipeline::new(args.source.into()).context("Failed to set up validation")?;
    eprintln!("{} Validating job definitions...", out.info());

    let mut report = pipeline.run();

    let mut destinations = 0;
    for (destination, config) in report.aggregator.non_empty() {
        match pipeline::render(config) {
            Ok(_) => {
                destinations += 1;
                eprintln!(
                    "   {} {} ({} presubmit(s), {} postsubmit(s), {} periodic(s))",
                    emoji(&out, "📄", "[FILE]"),
                    destination,
                    config.presubmit_count(),
                    config.postsubmit_count(),
                    config.periodic_count()
                );
            }
            Err(e) => report.errors.push_scoped(destination.to_string(), e),
        }
    }

    finish(&out, &report.errors, "Validation")?;

    eprintln!(
        "{} Job definitions are valid ({} destination(s))",
        out.ok(),
        destinations
    );
    Ok(())
}
