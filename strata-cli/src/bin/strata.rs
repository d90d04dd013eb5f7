//! `strata`: merge layered configuration files and write their output.

use anyhow::Result;
use clap::Parser;
use strata_cli::cli::RenderArgs;
use strata_cli::{commands, logging};

fn main() -> Result<()> {
    let args = RenderArgs::parse();
    logging::init(args.verbose);
    commands::render(&args)?;
    Ok(())
}
