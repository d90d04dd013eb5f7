//! Structural intersection and subtraction of value trees.
//!
//! Both operations compare a candidate tree A against a baseline B:
//!
//! - [`intersect`] keeps the shape the two share and marks differing leaves
//!   with `"$required"`, which is how a common base layer is derived from a
//!   set of concrete configurations;
//! - [`subtract`] keeps what A needs on top of B, which is how a minimal
//!   override layer is derived.
//!
//! Only keys present on both sides are compared. Lists are compared entity
//! by entity: an element of A is paired with the first element of B naming
//! the same entity (by default through `name` or `metadata.name`).

mod correlate;

use serde_json::{Map, Value};

use crate::directive::{MAX_DEPTH, REQUIRED};
use crate::error::{StrataError, StrataResult};
use crate::value::canonicalize;

use correlate::correlates;

/// Tuning for list correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Dotted key paths identifying list entries, tried in order.
    pub list_matchers: Vec<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            list_matchers: vec!["name".to_owned(), "metadata.name".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Intersect,
    Subtract,
}

impl Mode {
    const fn root(self) -> &'static str {
        match self {
            Self::Intersect => "$<intersect>",
            Self::Subtract => "$<subtract>",
        }
    }

    /// Result for two values that differ irreconcilably.
    fn mismatch(self, a: Value) -> Value {
        match self {
            Self::Intersect => Value::String(REQUIRED.to_owned()),
            Self::Subtract => a,
        }
    }
}

/// The shape `a` and `b` have in common, with differing leaves replaced by
/// `"$required"`.
///
/// Returns `null` when either side is `null`.
///
/// # Errors
///
/// Returns [`StrataError::DepthExceeded`] for inputs nested beyond
/// [`MAX_DEPTH`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::intersect;
///
/// let a = json!([{"name": "x", "val": 1}]);
/// let b = json!([{"name": "x", "val": 2}]);
/// assert_eq!(intersect(a, b)?, json!([{"name": "x", "val": "$required"}]));
/// # Ok::<_, strata::StrataError>(())
/// ```
pub fn intersect(a: Value, b: Value) -> StrataResult<Value> {
    intersect_with(a, b, &DiffOptions::default())
}

/// [`intersect`] with explicit list matchers.
///
/// # Errors
///
/// See [`intersect`].
pub fn intersect_with(a: Value, b: Value, options: &DiffOptions) -> StrataResult<Value> {
    diff(a, b, options, Mode::Intersect)
}

/// The overlay that, merged onto `b`, supplies what `a` holds differently.
///
/// Returns `null` when either side is `null`, or when `a` and `b` are equal
/// scalars or equal lists of correlated entities; equal maps yield an empty
/// map. List elements no matcher correlates pass through unchanged, so equal
/// lists of scalars are kept whole.
///
/// # Errors
///
/// Returns [`StrataError::DepthExceeded`] for inputs nested beyond
/// [`MAX_DEPTH`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::subtract;
///
/// let a = json!({"image": "web:2", "replicas": 3, "tier": "front"});
/// let b = json!({"image": "web:1", "replicas": 3, "tier": "front"});
/// assert_eq!(subtract(a, b)?, json!({"image": "web:2"}));
/// # Ok::<_, strata::StrataError>(())
/// ```
pub fn subtract(a: Value, b: Value) -> StrataResult<Value> {
    subtract_with(a, b, &DiffOptions::default())
}

/// [`subtract`] with explicit list matchers.
///
/// # Errors
///
/// See [`subtract`].
pub fn subtract_with(a: Value, b: Value, options: &DiffOptions) -> StrataResult<Value> {
    diff(a, b, options, Mode::Subtract)
}

fn diff(a: Value, b: Value, options: &DiffOptions, mode: Mode) -> StrataResult<Value> {
    let walker = Walker { options, mode };
    let result = walker.walk(mode.root(), canonicalize(a), &canonicalize(b), 0)?;
    Ok(result.unwrap_or(Value::Null))
}

struct Walker<'o> {
    options: &'o DiffOptions,
    mode: Mode,
}

impl Walker<'_> {
    fn walk(&self, path: &str, a: Value, b: &Value, depth: usize) -> StrataResult<Option<Value>> {
        if depth > MAX_DEPTH {
            return Err(StrataError::DepthExceeded { limit: MAX_DEPTH }.with_context(path));
        }
        match (a, b) {
            (Value::Null, _) | (_, Value::Null) => Ok(None),
            (Value::Object(a), Value::Object(b)) => self
                .walk_maps(path, a, b, depth)
                .map(|map| Some(Value::Object(map))),
            (Value::Array(a), Value::Array(b)) => self.walk_lists(path, a, b, depth),
            (a @ (Value::Object(_) | Value::Array(_)), _) | (a, Value::Object(_) | Value::Array(_)) => {
                Ok(Some(self.mode.mismatch(a)))
            }
            (a, b) if a == *b => Ok(match self.mode {
                Mode::Intersect => Some(a),
                Mode::Subtract => None,
            }),
            (a, _) => Ok(Some(self.mode.mismatch(a))),
        }
    }

    fn walk_maps(
        &self,
        path: &str,
        a: Map<String, Value>,
        b: &Map<String, Value>,
        depth: usize,
    ) -> StrataResult<Map<String, Value>> {
        let mut result = Map::new();
        for (key, value) in a {
            let Some(other) = b.get(&key) else {
                continue;
            };
            if self.mode == Mode::Subtract && value.is_null() && other.is_null() {
                continue;
            }
            let child = format!("{path}.{key}");
            if let Some(kept) = self.walk(&child, value, other, depth + 1)? {
                if !is_empty_map(&kept) {
                    result.insert(key, kept);
                }
            }
        }
        Ok(result)
    }

    fn walk_lists(
        &self,
        path: &str,
        a: Vec<Value>,
        b: &[Value],
        depth: usize,
    ) -> StrataResult<Option<Value>> {
        let mut result = Vec::new();
        for item in a {
            let partner = b
                .iter()
                .find(|candidate| correlates(&item, candidate, &self.options.list_matchers));
            match (item, partner) {
                (Value::Object(item), Some(Value::Object(partner))) => {
                    let kept = self.walk_maps(path, item, partner, depth + 1)?;
                    if !kept.is_empty() {
                        result.push(Value::Object(kept));
                    }
                }
                (item, _) => result.push(item),
            }
        }

        if !result.is_empty() {
            return Ok(Some(Value::Array(result)));
        }
        Ok(match self.mode {
            Mode::Intersect => Some(Value::Array(vec![Value::String(REQUIRED.to_owned())])),
            Mode::Subtract => None,
        })
    }
}

fn is_empty_map(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}
