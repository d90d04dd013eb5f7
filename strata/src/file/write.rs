//! Atomic replacement of output files.

use std::fs::Permissions;
use std::io::{self, Write};

use camino::Utf8Path;
use tempfile::NamedTempFile;

/// Mode given to output files that did not exist before.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Write `contents` to `path` through a temporary sibling that replaces
/// `path` only once fully written.
///
/// An existing file keeps its permissions; a new file is created readable by
/// everyone and writable by its owner. A failure leaves `path` untouched.
///
/// # Errors
///
/// Returns the underlying I/O error when staging, writing or renaming fails.
///
/// # Examples
///
/// ```
/// use strata::file::write_atomic;
/// use test_helpers::layers::LayerDir;
///
/// let dir = LayerDir::new()?;
/// let target = dir.path("out.json");
/// write_atomic(&target, b"{}\n")?;
/// assert_eq!(dir.read("out.json")?, "{}\n");
/// # Ok::<_, anyhow::Error>(())
/// ```
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.flush()?;
    if let Some(permissions) = target_permissions(path)? {
        staged.as_file().set_permissions(permissions)?;
    }
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Permissions the replacement file should carry.
fn target_permissions(path: &Utf8Path) -> io::Result<Option<Permissions>> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
const fn new_file_permissions() -> Option<Permissions> {
    None
}
