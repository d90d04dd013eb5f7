//! Partial deep equality used by `$match`.

use serde_json::Value;

/// Whether `doc` satisfies `pattern`.
///
/// Map patterns only constrain the keys they define; every such key must
/// exist in `doc` and match recursively. List patterns match lists of the same
/// length element by element. Scalars compare by equality, and a map never
/// matches a non-map.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::value::matches;
///
/// let doc = json!({"kind": "Service", "metadata": {"name": "web", "labels": {}}});
/// assert!(matches(&doc, &json!({"metadata": {"name": "web"}})));
/// assert!(!matches(&doc, &json!({"kind": "Deployment"})));
/// ```
#[must_use]
pub fn matches(doc: &Value, pattern: &Value) -> bool {
    match (doc, pattern) {
        (Value::Object(fields), Value::Object(wanted)) => wanted.iter().all(|(key, expected)| {
            fields
                .get(key)
                .is_some_and(|actual| matches(actual, expected))
        }),
        (Value::Array(items), Value::Array(wanted)) => {
            items.len() == wanted.len()
                && items
                    .iter()
                    .zip(wanted)
                    .all(|(actual, expected)| matches(actual, expected))
        }
        (Value::Object(_), _) | (_, Value::Object(_)) => false,
        _ => doc == pattern,
    }
}
