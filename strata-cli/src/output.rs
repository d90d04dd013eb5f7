//! Output writers for the command-line tools.

use std::io::Write;

use camino::Utf8Path;
use strata::file::write_atomic;

use crate::error::StrataCliError;

/// Write `rendered` to `path`, or to stdout when `path` is `None`.
///
/// Files are replaced atomically through a temporary sibling and keep
/// their permissions.
///
/// # Errors
///
/// Returns [`StrataCliError::Io`] or [`StrataCliError::Stdout`] when
/// writing fails.
pub fn emit(rendered: &str, path: Option<&Utf8Path>) -> Result<(), StrataCliError> {
    match path {
        Some(path) => write_file(path, rendered),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(StrataCliError::Stdout)
        }
    }
}

fn write_file(path: &Utf8Path, rendered: &str) -> Result<(), StrataCliError> {
    write_atomic(path, rendered.as_bytes()).map_err(|source| StrataCliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
