//! # CLI Command Implementations
//!
//! Each subcommand of `pjgen` lives in its own file with an `Args` struct
//! derived using `clap` and an `execute` function that calls into the
//! `pjgen` library.
//!
//! `create` and `validate` share [`SourceArgs`], so a `validate` run sees
//! exactly the inputs a `create` run with the same flags would.

pub mod completions;
pub mod create;
pub mod validate;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};

use pjgen::aggregate::SortOrder;
use pjgen::error::ErrorCollection;
use pjgen::output::OutputConfig;
use pjgen::pipeline::{Input, PipelineOptions};

/// Record ordering within each output collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Ascending by job name
    #[default]
    Asc,
    /// Descending by job name
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Asc => SortOrder::Ascending,
            SortArg::Desc => SortOrder::Descending,
        }
    }
}

/// Comma-separated fallback for `--global`.
pub const GLOBAL_ENV: &str = "PJGEN_GLOBAL";
/// Comma-separated fallback for `--input`.
pub const INPUT_ENV: &str = "PJGEN_INPUT";

/// Where job definitions come from and where generated configuration goes
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// File whose `global_defaults` apply to every job; repeat for more,
    /// earlier files win [env: PJGEN_GLOBAL, comma-separated]
    #[arg(short, long = "global", value_name = "FILE")]
    pub global: Vec<PathBuf>,

    /// Job definition file or directory ("-" for stdin, the default);
    /// repeat for more [env: PJGEN_INPUT, comma-separated]
    #[arg(short, long = "input", value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// Output file or directory ("-" for stdout, the default)
    #[arg(short, long, value_name = "PATH", env = "PJGEN_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Order of records within each collection
    #[arg(
        short,
        long,
        value_enum,
        value_name = "ORDER",
        env = "PJGEN_SORT",
        default_value = "asc"
    )]
    pub sort: SortArg,
}

/// Split a comma-separated path list, dropping empty items.
fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Use `flags` when given, otherwise the comma-separated list in `var`.
fn or_env(flags: Vec<PathBuf>, var: &str) -> Vec<PathBuf> {
    if !flags.is_empty() {
        return flags;
    }
    std::env::var(var)
        .map(|value| split_paths(&value))
        .unwrap_or_default()
}

impl From<SourceArgs> for PipelineOptions {
    fn from(args: SourceArgs) -> Self {
        PipelineOptions {
            globals: or_env(args.global, GLOBAL_ENV),
            inputs: or_env(args.input, INPUT_ENV)
                .into_iter()
                .map(Input::from_arg)
                .collect(),
            output: args.output,
            sort: args.sort.into(),
        }
    }
}

/// Print `errors` to stderr and turn a non-empty collection into a failure.
pub(crate) fn finish(out: &OutputConfig, errors: &ErrorCollection, action: &str) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    eprintln!(
        "{} {} finished with {} error(s):",
        out.err(),
        action,
        errors.len()
    );
    eprintln!("{}", out.error_list(errors));
    Err(anyhow!("{} failed with {} error(s)", action, errors.len()))
}
