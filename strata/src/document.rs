//! Documents tracked by a [`Session`](crate::Session).
//!
//! A document is one configuration unit: the value tree accumulated so far,
//! an opaque identifier, and the identifiers of the layer documents that were
//! merged into it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier of a [`Document`].
///
/// Identifiers are allocated from a monotonic counter and render as
/// `doc_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc_{}", self.0)
    }
}

/// A value tree with identity and provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    parents: Vec<DocumentId>,
    data: Value,
}

impl Document {
    /// An empty (`null`) document with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(Value::Null)
    }

    /// A document holding `data` with a fresh identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::document::Document;
    ///
    /// let doc = Document::with_data(json!({"a": 1}));
    /// assert_ne!(doc.id(), Document::new().id());
    /// assert!(doc.to_string().starts_with("doc_"));
    /// ```
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        Self {
            id: DocumentId::next(),
            parents: Vec::new(),
            data,
        }
    }

    /// The document's identifier.
    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// Identifiers of the documents merged into this one, oldest first.
    #[must_use]
    pub fn parents(&self) -> &[DocumentId] {
        &self.parents
    }

    /// The current value tree.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Consume the document, returning its value tree.
    #[must_use]
    pub fn into_data(self) -> Value {
        self.data
    }

    pub(crate) fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    pub(crate) fn record_parent(&mut self, parent: DocumentId) {
        self.parents.push(parent);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}
