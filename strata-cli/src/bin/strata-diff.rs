//! `strata-diff`: intersect or subtract two configurations.

use anyhow::Result;
use clap::Parser;
use strata_cli::cli::DiffArgs;
use strata_cli::{commands, logging};

fn main() -> Result<()> {
    let args = DiffArgs::parse();
    logging::init(args.verbose);
    commands::diff(&args)?;
    Ok(())
}
