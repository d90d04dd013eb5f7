//! Extraction of `$required` leaves.
//!
//! A base layer often marks values that every deployment must supply. This
//! pass reduces a merged tree to just those markers so tooling can list what
//! is still missing.

use serde_json::{Map, Value};

use crate::directive::REQUIRED;

/// Keep only the `"$required"` leaves of `value` and the containers leading to
/// them.
///
/// Returns `None` when `value` holds no marker.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::required::extract_required;
///
/// let doc = json!({
///     "name": "web",
///     "image": "$required",
///     "ports": [80, "$required"],
///     "env": {"DEBUG": "0"},
/// });
/// assert_eq!(
///     extract_required(&doc),
///     Some(json!({"image": "$required", "ports": ["$required"]}))
/// );
/// assert_eq!(extract_required(&json!({"a": 1})), None);
/// ```
#[must_use]
pub fn extract_required(value: &Value) -> Option<Value> {
    match value {
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .iter()
                .filter_map(|(key, child)| extract_required(child).map(|v| (key.clone(), v)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items.iter().filter_map(extract_required).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        Value::String(text) if text == REQUIRED => Some(value.clone()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}
