//! Targets of `$merge` and `$replace`.

use std::fmt;

use serde_json::{Map, Value};

use crate::directive::{MATCH, MERGE};
use crate::error::{StrataError, StrataResult};
use crate::value::{kind_name, matches, summarize};

const PATH_KEY: &str = "path";
const INDEX_KEY: &str = "index";

/// Which document a reference reads from.
#[derive(Debug)]
enum Target<'r> {
    /// The document being processed.
    Current,
    /// The first session document matching a pattern.
    Matching(&'r Value),
    /// The session document at a position.
    Index(usize),
}

/// A parsed reference: a document plus a dotted path inside it.
#[derive(Debug)]
pub(super) struct Reference<'r> {
    target: Target<'r>,
    path: &'r str,
}

impl<'r> Reference<'r> {
    /// Parse a bare path string or a selector map.
    ///
    /// Selectors take the shape `{"$match": <pattern>, "path": <path>}` or
    /// `{"index": <n>, "path": <path>}`; `path` defaults to the document root.
    pub(super) fn parse(value: &'r Value, directive: &'static str) -> StrataResult<Self> {
        match value {
            Value::String(path) => Ok(Self {
                target: Target::Current,
                path,
            }),
            Value::Object(selector) => Self::parse_selector(selector, directive),
            other => Err(StrataError::InvalidMergeType {
                directive,
                found: kind_name(other),
            }),
        }
    }

    fn parse_selector(
        selector: &'r Map<String, Value>,
        directive: &'static str,
    ) -> StrataResult<Self> {
        let invalid = |message: String| StrataError::InvalidDirectiveValue { directive, message };
        let path = match selector.get(PATH_KEY) {
            None => "",
            Some(Value::String(path)) => path,
            Some(other) => {
                return Err(invalid(format!(
                    "selector path must be a string, found {}",
                    kind_name(other)
                )));
            }
        };
        let target = if let Some(pattern) = selector.get(MATCH) {
            Target::Matching(pattern)
        } else if let Some(index) = selector.get(INDEX_KEY) {
            let index = index
                .as_u64()
                .and_then(|index| usize::try_from(index).ok())
                .ok_or_else(|| {
                    invalid(format!(
                        "selector index must be a non-negative integer, found {}",
                        summarize(index)
                    ))
                })?;
            Target::Index(index)
        } else {
            return Err(invalid(format!(
                "selector needs either {MATCH} or {INDEX_KEY}"
            )));
        };
        Ok(Self { target, path })
    }

    /// Dotted path inside the selected document.
    pub(super) const fn path(&self) -> &str {
        self.path
    }

    /// Pick the document the path resolves against.
    pub(super) fn document<'d>(
        &self,
        current: &'d Value,
        documents: &[&'d Value],
    ) -> StrataResult<&'d Value> {
        match self.target {
            Target::Current => Ok(current),
            Target::Matching(pattern) => documents
                .iter()
                .copied()
                .find(|doc| matches(doc, pattern))
                .ok_or_else(|| StrataError::NoMatchFound {
                    pattern: summarize(pattern),
                }),
            Target::Index(index) => {
                documents
                    .get(index)
                    .copied()
                    .ok_or(StrataError::InvalidIndex {
                        index,
                        len: documents.len(),
                    })
            }
        }
    }

    /// The not-found error matching `directive`.
    pub(super) fn not_found(&self, directive: &str) -> StrataError {
        let path = self.to_string();
        if directive == MERGE {
            StrataError::MergeReferenceNotFound { path }
        } else {
            StrataError::ReplaceReferenceNotFound { path }
        }
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Target::Current => f.write_str(self.path),
            Target::Matching(pattern) => write!(f, "[{}]:{}", summarize(pattern), self.path),
            Target::Index(index) => write!(f, "[doc{index}]:{}", self.path),
        }
    }
}
