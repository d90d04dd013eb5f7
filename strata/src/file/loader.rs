//! Loading entrypoints for single layers and `$parent` chains.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tracing::debug;

use crate::directive::PARENT;
use crate::document::Document;
use crate::error::{StrataError, StrataResult};
use crate::format::{FormatRegistry, extension};
use crate::value::kind_name;

use super::path::{canonicalise, find_layer, implied_parent, normalise_cycle_key, not_found};

/// Where a layer inherits from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    /// Another layer file, resolved relative to the declaring layer.
    Path(Utf8PathBuf),
    /// The end of the chain.
    None,
}

impl Parent {
    /// The parent path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::None => None,
        }
    }
}

/// One loaded file: its documents and the layer it inherits from.
#[derive(Debug, Clone)]
pub struct Layer {
    path: Utf8PathBuf,
    documents: Vec<Document>,
    parent: Parent,
}

impl Layer {
    /// Path the layer was read from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Decoded documents with `$parent` stripped.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The layer this one inherits from.
    #[must_use]
    pub const fn parent(&self) -> &Parent {
        &self.parent
    }
}

/// Read and decode the layer at `path`, extracting its parent.
///
/// The format is chosen by the file extension. `$parent` is read from the
/// first document: a string names a file relative to the layer's directory,
/// and `false` ends the chain. Without `$parent`, dotted names imply a parent
/// (`app.prod.yaml` inherits from `app.yaml` when it exists). The key is
/// removed from every document.
///
/// # Errors
///
/// Returns [`StrataError::File`] when the file cannot be read or decoded or
/// has no registered extension, and [`StrataError::InvalidParent`] when
/// `$parent` is neither a non-empty string nor `false`.
pub fn load_layer(path: &Utf8Path, registry: &FormatRegistry) -> StrataResult<Layer> {
    debug!(%path, "loading layer");
    let ext = extension(path).ok_or_else(|| {
        StrataError::file(path, "cannot infer format: file has no extension")
    })?;
    let format = registry.get(&ext).map_err(|err| StrataError::file(path, err))?;
    let text = std::fs::read_to_string(path).map_err(|err| StrataError::file(path, err))?;
    let mut values = format
        .decode(&text)
        .map_err(|err| StrataError::file(path, err))?;

    let parent = match values.first().and_then(|first| first.get(PARENT)) {
        Some(declared) => declared_parent(path, declared)?,
        None => implied_parent(path, registry).map_or(Parent::None, Parent::Path),
    };
    for value in &mut values {
        if let Value::Object(map) = value {
            map.remove(PARENT);
        }
    }

    Ok(Layer {
        path: path.to_path_buf(),
        documents: values.into_iter().map(Document::with_data).collect(),
        parent,
    })
}

fn declared_parent(path: &Utf8Path, declared: &Value) -> StrataResult<Parent> {
    match declared {
        Value::Bool(false) => Ok(Parent::None),
        Value::String(target) if target.is_empty() => Err(StrataError::invalid_parent(
            path,
            "must be a non-empty path",
        )),
        Value::String(target) => {
            let dir = path.parent().unwrap_or_else(|| Utf8Path::new(""));
            Ok(Parent::Path(dir.join(target)))
        }
        other => Err(StrataError::invalid_parent(
            path,
            format!("expected a path or false, found {}", kind_name(other)),
        )),
    }
}

/// Load `path` and every ancestor it names, oldest first.
///
/// Each path is located with [`find_layer`], so parents may omit or change
/// their extension. Canonical paths are tracked to reject cycles.
///
/// # Errors
///
/// Returns [`StrataError::CyclicParent`] when a layer is reached twice,
/// [`StrataError::File`] when a layer or parent is missing, and any error
/// from [`load_layer`].
///
/// # Examples
///
/// ```
/// use strata::FormatRegistry;
/// use strata::file::load_chain;
/// use test_helpers::layers::LayerDir;
///
/// let dir = LayerDir::new()?;
/// dir.write("app.yaml", "name: web\n")?;
/// let prod = dir.write("app.prod.yaml", "replicas: 3\n")?;
/// let chain = load_chain(&prod, &FormatRegistry::builtin())?;
/// let names: Vec<_> = chain.iter().map(|layer| layer.path().file_name()).collect();
/// assert_eq!(names, [Some("app.yaml"), Some("app.prod.yaml")]);
/// # Ok::<_, anyhow::Error>(())
/// ```
pub fn load_chain(path: &Utf8Path, registry: &FormatRegistry) -> StrataResult<Vec<Layer>> {
    let mut visited = HashSet::new();
    let mut stack: Vec<Utf8PathBuf> = Vec::new();
    let mut layers = Vec::new();
    let mut next = Some(path.to_path_buf());

    while let Some(requested) = next.take() {
        let Some(found) = find_layer(&requested, registry) else {
            return Err(missing_layer(&requested, stack.last()));
        };
        let canonical = canonicalise(&found)?;
        if !visited.insert(normalise_cycle_key(&canonical)) {
            stack.push(canonical);
            let cycle: Vec<&str> = stack.iter().map(|path| path.as_str()).collect();
            return Err(StrataError::CyclicParent {
                cycle: cycle.join(" -> "),
            });
        }
        stack.push(canonical);

        let layer = load_layer(&found, registry)?;
        next = layer.parent().path().map(Utf8Path::to_path_buf);
        layers.push(layer);
    }

    layers.reverse();
    Ok(layers)
}

fn missing_layer(path: &Utf8Path, referenced_from: Option<&Utf8PathBuf>) -> StrataError {
    let message = match referenced_from {
        Some(child) => format!("parent layer '{path}' does not exist (referenced from '{child}')"),
        None => format!("layer '{path}' does not exist"),
    };
    not_found(path, message)
}
