//! Output selection and the final shape check.
//!
//! After processing, a document is split into the objects it emits:
//! every map marked `$output: true` becomes an output of its own, and a
//! document without markers is emitted whole. [`validate`] then rejects
//! anything the directive passes should have consumed.

use serde_json::Value;

use crate::directive::{OUTPUT, OUTPUT_DIRECTIVES, REQUIRED};
use crate::error::{StrataError, StrataResult};

/// Label used for the document root in validation errors.
const ROOT_LABEL: &str = "<root>";

/// Split a processed tree into its output objects.
///
/// Maps carrying `$output: true` are collected in document order with the
/// marker removed. Selection does not look inside a selected map, so nested
/// markers stay put and are caught by [`validate`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::output::select_outputs;
///
/// let tree = json!({
///     "shared": {"image": "web:1"},
///     "a": {"$output": true, "name": "a"},
///     "list": [{"$output": true, "name": "b"}],
/// });
/// assert_eq!(select_outputs(tree), vec![json!({"name": "a"}), json!({"name": "b"})]);
///
/// assert_eq!(select_outputs(json!({"a": 1})), vec![json!({"a": 1})]);
/// ```
#[must_use]
pub fn select_outputs(value: Value) -> Vec<Value> {
    if !has_selection(&value) {
        return vec![value];
    }
    let mut outputs = Vec::new();
    collect(value, &mut outputs);
    outputs
}

fn is_selected(value: &Value) -> bool {
    value.get(OUTPUT) == Some(&Value::Bool(true))
}

fn has_selection(value: &Value) -> bool {
    match value {
        Value::Object(map) => is_selected(value) || map.values().any(has_selection),
        Value::Array(items) => items.iter().any(has_selection),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

fn collect(value: Value, outputs: &mut Vec<Value>) {
    match value {
        Value::Object(mut map) if map.get(OUTPUT) == Some(&Value::Bool(true)) => {
            map.remove(OUTPUT);
            outputs.push(Value::Object(map));
        }
        Value::Object(map) => map.into_iter().for_each(|(_, child)| collect(child, outputs)),
        Value::Array(items) => items.into_iter().for_each(|child| collect(child, outputs)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Reject an output that still carries directives or `$required` markers.
///
/// # Errors
///
/// Returns [`StrataError::LeftoverDirective`] for the first directive key
/// found and [`StrataError::RequiredValueMissing`] for the first `"$required"`
/// string, both naming the dotted location.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::output::validate;
///
/// assert!(validate(&json!({"name": "web"})).is_ok());
/// let err = validate(&json!({"spec": {"image": "$required"}})).unwrap_err();
/// assert_eq!(err.to_string(), "required value missing at spec.image");
/// ```
pub fn validate(value: &Value) -> StrataResult<()> {
    validate_at(value, &mut Vec::new())
}

fn validate_at(value: &Value, path: &mut Vec<String>) -> StrataResult<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                if OUTPUT_DIRECTIVES.contains(&key.as_str()) {
                    return Err(StrataError::LeftoverDirective {
                        path: render(path),
                        directive: key.clone(),
                    });
                }
                validate_at(child, path)?;
                path.pop();
            }
            Ok(())
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                validate_at(child, path)?;
                path.pop();
            }
            Ok(())
        }
        Value::String(text) if text == REQUIRED => Err(StrataError::RequiredValueMissing {
            path: render(path),
        }),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
    }
}

fn render(path: &[String]) -> String {
    if path.is_empty() {
        ROOT_LABEL.to_owned()
    } else {
        path.join(".")
    }
}

#[cfg(test)]
mod tests;
