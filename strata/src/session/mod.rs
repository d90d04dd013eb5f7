//! The running multi-document merge state.
//!
//! A [`Session`] holds an ordered list of documents addressed by position.
//! Layers merge into it document by document: the n-th document of a layer
//! patches the n-th document of the session, unless it carries `$match`, in
//! which case it patches every document the pattern selects. The session
//! only grows; reading it never hands out mutable access to its trees.

mod output;

use std::sync::Arc;

use camino::Utf8Path;
use serde_json::Value;
use tracing::debug;

use crate::directive::MATCH;
use crate::document::{Document, DocumentId};
use crate::error::{StrataError, StrataResult, StrataResultExt};
use crate::file::{Layer, load_chain, load_layer};
use crate::format::FormatRegistry;
use crate::merge::merge;
use crate::value::{canonicalize, matches, summarize};

/// Ordered documents built up by successive merges.
#[derive(Debug, Clone)]
pub struct Session {
    documents: Vec<Document>,
    registry: Arc<FormatRegistry>,
}

impl Session {
    /// An empty session using the built-in formats.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Arc::new(FormatRegistry::builtin()))
    }

    /// An empty session decoding and encoding through `registry`.
    #[must_use]
    pub const fn with_registry(registry: Arc<FormatRegistry>) -> Self {
        Self {
            documents: Vec::new(),
            registry,
        }
    }

    /// Formats available to this session.
    #[must_use]
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Merge `patch` into the document at `index`.
    ///
    /// The session is padded with `null` documents to reach `index`. When
    /// `patch` is a map carrying `$match`, `index` is ignored: the pattern is
    /// removed and the rest of the patch is merged into every matching
    /// document instead.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::NoMatchFound`] when `$match` selects nothing and
    /// any error raised by [`merge`].
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::Session;
    ///
    /// let mut session = Session::new();
    /// session.apply_patch(0, json!({"kind": "Service", "port": 80}))?;
    /// session.apply_patch(1, json!({"kind": "Deployment"}))?;
    /// session.apply_patch(5, json!({"$match": {"kind": "Service"}, "port": 443}))?;
    ///
    /// assert_eq!(session.len(), 2);
    /// assert_eq!(session.document(0)?, json!({"kind": "Service", "port": 443}));
    /// # Ok::<_, strata::StrataError>(())
    /// ```
    pub fn apply_patch(&mut self, index: usize, patch: Value) -> StrataResult<()> {
        self.apply(index, canonicalize(patch), None)
    }

    fn apply(&mut self, index: usize, patch: Value, origin: Option<DocumentId>) -> StrataResult<()> {
        let (patch, pattern) = split_match(patch);
        match pattern {
            Some(pattern) => self.apply_matching(&pattern, &patch, origin),
            None => self.apply_at(index, patch, origin),
        }
    }

    fn apply_matching(
        &mut self,
        pattern: &Value,
        patch: &Value,
        origin: Option<DocumentId>,
    ) -> StrataResult<()> {
        let targets: Vec<usize> = self
            .documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| matches(doc.data(), pattern))
            .map(|(index, _)| index)
            .collect();
        if targets.is_empty() {
            return Err(StrataError::NoMatchFound {
                pattern: summarize(pattern),
            });
        }
        for index in targets {
            self.apply(index, patch.clone(), origin)?;
        }
        Ok(())
    }

    fn apply_at(
        &mut self,
        index: usize,
        patch: Value,
        origin: Option<DocumentId>,
    ) -> StrataResult<()> {
        let len = self.documents.len();
        let end = index
            .checked_add(1)
            .ok_or(StrataError::InvalidIndex { index, len })?;
        let current = self
            .documents
            .get(index)
            .map_or(Value::Null, |doc| doc.data().clone());
        let merged = merge(current, patch)?;

        // Pad only once the merge has succeeded.
        if end > len {
            self.documents.resize_with(end, Document::new);
        }
        let slot = self
            .documents
            .get_mut(index)
            .ok_or(StrataError::InvalidIndex { index, len })?;
        slot.set_data(merged);
        if let Some(parent) = origin {
            slot.record_parent(parent);
        }
        Ok(())
    }

    /// Replay every document of `other` as a positional patch, in order.
    ///
    /// # Errors
    ///
    /// Propagates the first failure from [`Session::apply_patch`] semantics.
    pub fn merge_session(&mut self, other: &Self) -> StrataResult<()> {
        for (index, doc) in other.documents.iter().enumerate() {
            self.apply(index, doc.data().clone(), Some(doc.id()))?;
        }
        Ok(())
    }

    /// Merge the documents of a single file, ignoring its parents.
    ///
    /// # Errors
    ///
    /// Returns loader errors for unreadable files. Merge failures are
    /// wrapped with `[<path>:doc<n>]`.
    pub fn merge_file(&mut self, path: &Utf8Path) -> StrataResult<()> {
        let layer = load_layer(path, &self.registry)?;
        self.merge_layer(&layer)
    }

    /// Merge `path` together with its `$parent` chain, oldest layer first.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::CyclicParent`] for cyclic chains, loader errors
    /// for unreadable layers, and wrapped merge failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::Session;
    /// use test_helpers::layers::LayerDir;
    ///
    /// let dir = LayerDir::new()?;
    /// dir.write("app.yaml", "name: web\nreplicas: 1\n")?;
    /// let prod = dir.write("app.prod.yaml", "replicas: 3\n")?;
    ///
    /// let mut session = Session::new();
    /// session.merge_file_layers(&prod)?;
    /// assert_eq!(session.document(0)?, json!({"name": "web", "replicas": 3}));
    /// # Ok::<_, anyhow::Error>(())
    /// ```
    pub fn merge_file_layers(&mut self, path: &Utf8Path) -> StrataResult<()> {
        let chain = load_chain(path, &self.registry)?;
        for layer in &chain {
            self.merge_layer(layer)?;
        }
        Ok(())
    }

    /// Merge the documents of an already loaded layer.
    ///
    /// # Errors
    ///
    /// Merge failures are wrapped with `[<path>:doc<n>]`.
    pub fn merge_layer(&mut self, layer: &Layer) -> StrataResult<()> {
        let path = layer.path();
        for (index, doc) in layer.documents().iter().enumerate() {
            debug!(%path, document = index, "merging layer document");
            self.apply(index, doc.data().clone(), Some(doc.id()))
                .with_context(|| format!("[{path}:doc{index}]"))?;
        }
        Ok(())
    }

    /// Number of documents.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the session holds no documents.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// A copy of the merged (unprocessed) tree at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidIndex`] when `index` is out of range.
    pub fn document(&self, index: usize) -> StrataResult<Value> {
        self.document_ref(index).map(|doc| doc.data().clone())
    }

    /// The document at `index`, including its identity and provenance.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidIndex`] when `index` is out of range.
    pub fn document_ref(&self, index: usize) -> StrataResult<&Document> {
        self.documents.get(index).ok_or(StrataError::InvalidIndex {
            index,
            len: self.documents.len(),
        })
    }

    /// Copies of every merged (unprocessed) tree, in order.
    #[must_use]
    pub fn documents(&self) -> Vec<Value> {
        self.documents.iter().map(|doc| doc.data().clone()).collect()
    }

    /// Iterate over the documents in order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Separate a `$match` pattern from the rest of a patch.
///
/// A `null` pattern counts as no pattern.
fn split_match(patch: Value) -> (Value, Option<Value>) {
    match patch {
        Value::Object(mut map) => {
            let pattern = map.remove(MATCH).filter(|pattern| !pattern.is_null());
            (Value::Object(map), pattern)
        }
        other => (other, None),
    }
}

#[cfg(test)]
mod tests;
