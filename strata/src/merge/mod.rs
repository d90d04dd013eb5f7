//! Recursive combination of two value trees.
//!
//! [`merge`] takes ownership of both trees and returns the combined result.
//! Maps merge key by key, lists concatenate, and scalars are overridden.
//! Two directives alter this:
//!
//! - a `null` value deletes the key it is assigned to;
//! - `$patch: replace` on a map discards the destination map, and on a list
//!   element removes the destination element at the same position.

use serde_json::{Map, Value};

use crate::directive::{MAX_DEPTH, PATCH, PATCH_REPLACE};
use crate::error::{StrataError, StrataResult, StrataResultExt};
use crate::value::kind_name;

/// Merge `src` over `dst`, consuming both.
///
/// # Errors
///
/// Returns [`StrataError::TypeMismatch`] when a map or list meets a value of
/// another kind, [`StrataError::InvalidPatchType`] or
/// [`StrataError::InvalidPatchValue`] for malformed `$patch` directives and
/// [`StrataError::DepthExceeded`] for trees nested beyond
/// [`MAX_DEPTH`](crate::directive::MAX_DEPTH). Failures are wrapped with the
/// key or index path leading to them.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::merge;
///
/// let merged = merge(
///     json!({"name": "web", "replicas": 1, "debug": true}),
///     json!({"replicas": 3, "debug": null}),
/// )?;
/// assert_eq!(merged, json!({"name": "web", "replicas": 3}));
/// # Ok::<_, strata::StrataError>(())
/// ```
pub fn merge(dst: Value, src: Value) -> StrataResult<Value> {
    merge_at(dst, src, 0)
}

fn merge_at(dst: Value, src: Value, depth: usize) -> StrataResult<Value> {
    if depth > MAX_DEPTH {
        return Err(StrataError::DepthExceeded { limit: MAX_DEPTH });
    }
    match (dst, src) {
        (dst, Value::Null) => Ok(dst),
        (Value::Object(dst), Value::Object(src)) => merge_maps(dst, src, depth).map(Value::Object),
        (Value::Array(dst), Value::Array(src)) => merge_lists(dst, src).map(Value::Array),
        (dst @ (Value::Object(_) | Value::Array(_)), src) => Err(StrataError::TypeMismatch {
            dst: kind_name(&dst),
            src: kind_name(&src),
        }),
        (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_), src) => Ok(src),
    }
}

fn merge_maps(
    mut dst: Map<String, Value>,
    mut src: Map<String, Value>,
    depth: usize,
) -> StrataResult<Map<String, Value>> {
    if is_replace_patch(&src)? {
        src.remove(PATCH);
        return Ok(src);
    }

    for (key, value) in src {
        if value.is_null() {
            dst.remove(&key);
            continue;
        }
        let merged = match dst.remove(&key) {
            Some(existing) => merge_at(existing, value, depth + 1).context(&key)?,
            None => value,
        };
        dst.insert(key, merged);
    }
    Ok(dst)
}

fn merge_lists(mut dst: Vec<Value>, src: Vec<Value>) -> StrataResult<Vec<Value>> {
    for (index, item) in src.into_iter().enumerate() {
        let removes = match &item {
            Value::Object(map) => is_replace_patch(map).context(index)?,
            _ => false,
        };
        if removes {
            if index < dst.len() {
                dst.remove(index);
            }
            continue;
        }
        dst.push(item);
    }
    Ok(dst)
}

/// Whether `map` carries a valid `$patch: replace` directive.
///
/// # Errors
///
/// Returns [`StrataError::InvalidPatchType`] when `$patch` is not a string and
/// [`StrataError::InvalidPatchValue`] for any string other than `replace`.
pub(crate) fn is_replace_patch(map: &Map<String, Value>) -> StrataResult<bool> {
    match map.get(PATCH) {
        None => Ok(false),
        Some(Value::String(value)) if value == PATCH_REPLACE => Ok(true),
        Some(Value::String(value)) => Err(StrataError::InvalidPatchValue {
            value: value.clone(),
        }),
        Some(other) => Err(StrataError::InvalidPatchType {
            found: kind_name(other),
        }),
    }
}
