//! Library half of the `strata` command-line tools.
//!
//! Each binary under `src/bin` parses its [`cli`] arguments, installs
//! [`logging`], and hands over to one of the [`commands`]. The wrapper binary
//! uses [`wrap`] instead.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod wrap;

pub use error::StrataCliError;
