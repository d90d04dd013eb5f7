//! Directive evaluation over a merged document.
//!
//! A [`Processor`] walks one merged tree and resolves the output-phase
//! directives in a fixed order per map: `$merge`, `$replace`, `$output`,
//! `$encode`, then the children. References resolve against the unprocessed
//! document (or, through a selector, another document of the session) and
//! their targets are processed afresh one level deeper, so the depth ceiling
//! doubles as the guard against reference cycles.

mod reference;

use serde_json::{Map, Value};
use tracing::trace;

use crate::directive::{
    ENCODE, MAX_DEPTH, MERGE, MERGE_PREFIX, OUTPUT, PATCH, REPLACE, REPLACE_PREFIX,
};
use crate::error::{StrataError, StrataResult, StrataResultExt};
use crate::format::FormatRegistry;
use crate::merge::{is_replace_patch, merge};
use crate::value::{get_path, kind_name, summarize};

use reference::Reference;

/// Evaluates directives for one document of a session.
#[derive(Debug, Clone)]
pub struct Processor<'a> {
    root: &'a Value,
    documents: Vec<&'a Value>,
    registry: &'a FormatRegistry,
}

impl<'a> Processor<'a> {
    /// Prepare to process `root`, with `documents` available to selector
    /// references and `registry` to `$encode`.
    #[must_use]
    pub fn new(
        root: &'a Value,
        documents: impl IntoIterator<Item = &'a Value>,
        registry: &'a FormatRegistry,
    ) -> Self {
        Self {
            root,
            documents: documents.into_iter().collect(),
            registry,
        }
    }

    /// Resolve every directive in `value`.
    ///
    /// Returns `None` when the whole value is omitted by `$output: false`.
    /// `$output: true` markers are kept for output selection.
    ///
    /// # Errors
    ///
    /// Fails on unresolved references, malformed directives, unknown formats,
    /// encoder failures, and with [`StrataError::CircularReference`] once the
    /// evaluation nests deeper than [`MAX_DEPTH`]. Nothing is returned for a
    /// document that fails part-way.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::FormatRegistry;
    /// use strata::process::Processor;
    ///
    /// let doc = json!({
    ///     "defaults": {"image": "web:1", "replicas": 1},
    ///     "app": {"$merge": "defaults", "replicas": 3},
    ///     "debug": {"$output": false, "level": "trace"},
    /// });
    /// let registry = FormatRegistry::builtin();
    /// let processed = Processor::new(&doc, [&doc], &registry).process(doc.clone())?;
    /// assert_eq!(
    ///     processed,
    ///     Some(json!({
    ///         "defaults": {"image": "web:1", "replicas": 1},
    ///         "app": {"image": "web:1", "replicas": 3},
    ///     }))
    /// );
    /// # Ok::<_, strata::StrataError>(())
    /// ```
    pub fn process(&self, value: Value) -> StrataResult<Option<Value>> {
        self.process_at(value, 0)
    }

    fn process_at(&self, value: Value, depth: usize) -> StrataResult<Option<Value>> {
        if depth > MAX_DEPTH {
            return Err(StrataError::CircularReference {
                limit: MAX_DEPTH,
                value: summarize(&value),
            });
        }
        match value {
            Value::Object(map) => self.process_map(map, depth),
            Value::Array(items) => self.process_list(items, depth),
            Value::String(text) => self.process_string(text, depth),
            other @ (Value::Null | Value::Bool(_) | Value::Number(_)) => Ok(Some(other)),
        }
    }

    fn process_map(
        &self,
        mut map: Map<String, Value>,
        depth: usize,
    ) -> StrataResult<Option<Value>> {
        if let Some(reference) = map.remove(MERGE) {
            let target = self.resolve(&reference, MERGE)?;
            let merged = merge(target, Value::Object(map)).context(MERGE)?;
            return self.process_at(merged, depth + 1);
        }

        if let Some(reference) = map.remove(REPLACE) {
            let target = self.resolve(&reference, REPLACE)?;
            return self.process_at(target, depth + 1);
        }

        let selected = match map.remove(OUTPUT) {
            None => false,
            Some(Value::Bool(false)) => return Ok(None),
            Some(Value::Bool(true)) => true,
            Some(other) => {
                return Err(StrataError::InvalidDirectiveValue {
                    directive: OUTPUT,
                    message: format!("expected true or false, found {}", kind_name(&other)),
                });
            }
        };

        let encode = map.remove(ENCODE).map(format_name).transpose()?;

        if is_replace_patch(&map)? {
            map.remove(PATCH);
        }

        let mut processed = Map::new();
        for (key, child) in map {
            if let Some(value) = self.process_at(child, depth + 1).context(&key)? {
                processed.insert(key, value);
            }
        }

        if let Some(format) = encode {
            return self.encode(&format, &Value::Object(processed)).map(Some);
        }
        if selected {
            processed.insert(OUTPUT.to_owned(), Value::Bool(true));
        }
        Ok(Some(Value::Object(processed)))
    }

    fn process_list(&self, items: Vec<Value>, depth: usize) -> StrataResult<Option<Value>> {
        if items.iter().any(is_omit_marker) {
            return Ok(None);
        }

        let mut encode = None;
        let mut processed = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            if let Some(format) = encode_marker(&item).context(index)? {
                encode = Some(format);
                continue;
            }
            if let Some(value) = self.process_at(item, depth + 1).context(index)? {
                processed.push(value);
            }
        }

        match encode {
            Some(format) => self.encode(&format, &Value::Array(processed)).map(Some),
            None => Ok(Some(Value::Array(processed))),
        }
    }

    fn process_string(&self, text: String, depth: usize) -> StrataResult<Option<Value>> {
        if let Some(path) = text.strip_prefix(MERGE_PREFIX) {
            trace!(directive = MERGE, path, "resolving string reference");
            let target = get_path(self.root, path).ok_or_else(|| {
                StrataError::MergeReferenceNotFound {
                    path: path.to_owned(),
                }
            })?;
            return self.process_at(target.clone(), depth + 1);
        }
        if let Some(path) = text.strip_prefix(REPLACE_PREFIX) {
            trace!(directive = REPLACE, path, "resolving string reference");
            let target = get_path(self.root, path).ok_or_else(|| {
                StrataError::ReplaceReferenceNotFound {
                    path: path.to_owned(),
                }
            })?;
            return self.process_at(target.clone(), depth + 1);
        }
        Ok(Some(Value::String(text)))
    }

    /// Clone the subtree a `$merge` or `$replace` reference points at.
    fn resolve(&self, reference: &Value, directive: &'static str) -> StrataResult<Value> {
        let reference = Reference::parse(reference, directive)?;
        trace!(directive, %reference, "resolving reference");
        let document = reference.document(self.root, &self.documents)?;
        get_path(document, reference.path())
            .cloned()
            .ok_or_else(|| reference.not_found(directive))
    }

    fn encode(&self, format: &str, value: &Value) -> StrataResult<Value> {
        self.registry
            .get(format)?
            .encode(value)
            .map(Value::String)
            .context(ENCODE)
    }
}

fn format_name(value: Value) -> StrataResult<String> {
    match value {
        Value::String(name) => Ok(name),
        other => Err(StrataError::InvalidDirectiveValue {
            directive: ENCODE,
            message: format!("expected a format name, found {}", kind_name(&other)),
        }),
    }
}

/// A list element of the form `{"$output": false}`.
fn is_omit_marker(item: &Value) -> bool {
    item.as_object()
        .is_some_and(|map| map.len() == 1 && map.get(OUTPUT) == Some(&Value::Bool(false)))
}

/// The format named by a list element of the form `{"$encode": <format>}`.
fn encode_marker(item: &Value) -> StrataResult<Option<String>> {
    match item.as_object() {
        Some(map) if map.len() == 1 => map
            .get(ENCODE)
            .cloned()
            .map(format_name)
            .transpose(),
        _ => Ok(None),
    }
}
