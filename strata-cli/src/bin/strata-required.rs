//! `strata-required`: reduce a layered configuration to its required fields.

use anyhow::Result;
use clap::Parser;
use strata_cli::cli::RequiredArgs;
use strata_cli::{commands, logging};

fn main() -> Result<()> {
    let args = RequiredArgs::parse();
    logging::init(args.verbose);
    commands::required(&args)?;
    Ok(())
}
