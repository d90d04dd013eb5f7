//! `strata-wrap`: run a tool on pre-merged layer files.

use anyhow::Result;
use strata_cli::{logging, wrap};

fn main() -> Result<()> {
    logging::init(false);
    let code = wrap::run(std::env::args_os().collect())?;
    std::process::exit(code)
}
