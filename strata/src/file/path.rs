//! Filesystem path helpers used while resolving layer files and parents.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{StrataError, StrataResult};
use crate::format::{FormatRegistry, extension};

/// Canonicalise `path`, resolving symlinks into an absolute path.
///
/// # Errors
///
/// Returns [`StrataError::File`] if canonicalisation fails, typically because
/// the path does not exist.
pub fn canonicalise(path: &Utf8Path) -> StrataResult<Utf8PathBuf> {
    path.canonicalize_utf8()
        .map_err(|err| StrataError::file(path, err))
}

/// Locate the layer file addressed by `path`.
///
/// `path` itself wins when it is a regular file. Otherwise every registered
/// format name is tried as an extension on the same stem, so `deploy/app`
/// and `deploy/app.json` both find `deploy/app.yaml`.
///
/// # Examples
///
/// ```
/// use strata::FormatRegistry;
/// use strata::file::find_layer;
/// use test_helpers::layers::LayerDir;
///
/// let dir = LayerDir::new()?;
/// let yaml = dir.write("app.yaml", "name: web\n")?;
/// let registry = FormatRegistry::builtin();
/// assert_eq!(find_layer(&dir.path("app.json"), &registry), Some(yaml.clone()));
/// assert_eq!(find_layer(&dir.path("app"), &registry), Some(yaml));
/// assert_eq!(find_layer(&dir.path("db.yaml"), &registry), None);
/// # Ok::<_, anyhow::Error>(())
/// ```
#[must_use]
pub fn find_layer(path: &Utf8Path, registry: &FormatRegistry) -> Option<Utf8PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let stem = stem_of(path, registry);
    registry
        .names()
        .map(|name| Utf8PathBuf::from(format!("{stem}.{name}")))
        .find(|candidate| candidate.is_file())
}

/// `path` without its extension when that extension names a registered
/// format.
fn stem_of<'a>(path: &'a Utf8Path, registry: &FormatRegistry) -> &'a str {
    match extension(path) {
        Some(ext) if registry.contains(&ext) => path
            .as_str()
            .rsplit_once('.')
            .map_or(path.as_str(), |(stem, _)| stem),
        _ => path.as_str(),
    }
}

/// Parent implied by a dotted file name.
///
/// `deploy/app.prod.yaml` implies `deploy/app.<ext>` for the first registered
/// extension that exists, trying the layer's own extension first. Names
/// without an inner dot imply nothing.
pub(super) fn implied_parent(path: &Utf8Path, registry: &FormatRegistry) -> Option<Utf8PathBuf> {
    let stem = path.file_stem()?;
    let (base, _) = stem.rsplit_once('.')?;
    if base.is_empty() {
        return None;
    }
    let dir = path.parent().unwrap_or_else(|| Utf8Path::new(""));
    let own = extension(path);
    own.iter()
        .map(String::as_str)
        .chain(registry.names())
        .map(|ext| dir.join(format!("{base}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Normalise a canonical path for case-insensitive cycle detection.
///
/// Filesystems that ignore case would otherwise let `Base.yaml` and
/// `base.yaml` slip past the visited set. On case-sensitive platforms the
/// path is returned unchanged.
pub(super) fn normalise_cycle_key(path: &Utf8Path) -> Utf8PathBuf {
    #[cfg(any(windows, target_os = "macos"))]
    {
        Utf8PathBuf::from(path.as_str().to_lowercase())
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    {
        path.to_path_buf()
    }
}

/// Build a [`StrataError::File`] carrying a not-found I/O error.
pub(super) fn not_found(path: &Utf8Path, message: String) -> StrataError {
    StrataError::file(
        path,
        std::io::Error::new(std::io::ErrorKind::NotFound, message),
    )
}
