//! # pjgen CLI
//!
//! Binary entry point for the `pjgen` command-line tool. Parses arguments
//! with `clap` and dispatches to the command implementations; all generation
//! logic lives in the `pjgen` library crate.
//!
//! Any error returned by a command is printed by `anyhow` and the process
//! exits with status 1.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
