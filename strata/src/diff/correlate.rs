//! Pairing list entries that describe the same entity.

use serde_json::Value;

/// Whether `a` and `b` name the same entity.
///
/// The matchers are tried in order; the first one both entries expose
/// decides, and the entries correlate only when the values there are equal.
/// Entries that are not maps never correlate.
pub(super) fn correlates(a: &Value, b: &Value, matchers: &[String]) -> bool {
    matchers
        .iter()
        .find_map(|matcher| Some((lookup(a, matcher)?, lookup(b, matcher)?)))
        .is_some_and(|(left, right)| left == right)
}

/// Follow a dotted key path through nested maps.
fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}
