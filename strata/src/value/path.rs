//! Dotted path lookup used by reference directives.

use serde_json::Value;

/// Resolve a dotted `path` inside `root`.
///
/// Segments select map entries by key and list entries by decimal index. The
/// empty path resolves to `root` itself. A path that ends on `null` counts as
/// unresolved, matching how merge treats `null` as deletion.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::value::get_path;
///
/// let root = json!({"spec": {"ports": [80, 443]}});
/// assert_eq!(get_path(&root, "spec.ports.1"), Some(&json!(443)));
/// assert_eq!(get_path(&root, "spec.missing"), None);
/// ```
#[must_use]
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    if !path.is_empty() {
        for segment in path.split('.') {
            current = step(current, segment)?;
        }
    }
    (!current.is_null()).then_some(current)
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}
