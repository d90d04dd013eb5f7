//! The generic value tree and the helpers every algorithm shares.
//!
//! All merge, processing and diff code works on [`serde_json::Value`]: a
//! closed enum over null, booleans, numbers, strings, lists and maps. Decoders
//! do not always agree on how a logical value is represented, so trees are
//! passed through [`canonicalize`] before any structural comparison.

mod path;
mod pattern;

pub use path::get_path;
pub use pattern::matches;

use serde_json::{Map, Number, Value};

/// Field name the TOML decoder uses to smuggle datetimes through serde.
const TOML_DATETIME_FIELD: &str = "$__toml_private_datetime";

/// Longest rendering of a value embedded in an error message.
const SUMMARY_LIMIT: usize = 80;

/// Normalise decoder-specific representations into one canonical shape.
///
/// - TOML datetimes, which surface as `{"$__toml_private_datetime": "..."}`,
///   collapse into their string form.
/// - Floats holding an exact integral value within `i64`/`u64` range become
///   integers, so `1.0` and `1` compare equal.
///
/// The function is total and idempotent.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::value::canonicalize;
///
/// let decoded = json!({"port": 8080.0, "at": {"$__toml_private_datetime": "1979-05-27"}});
/// assert_eq!(canonicalize(decoded), json!({"port": 8080, "at": "1979-05-27"}));
/// ```
#[must_use]
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => canonicalize_map(map),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        Value::Number(number) => Value::Number(canonicalize_number(number)),
        other @ (Value::Null | Value::Bool(_) | Value::String(_)) => other,
    }
}

fn canonicalize_map(map: Map<String, Value>) -> Value {
    if map.len() == 1 {
        if let Some(Value::String(text)) = map.get(TOML_DATETIME_FIELD) {
            return Value::String(text.clone());
        }
    }
    Value::Object(
        map.into_iter()
            .map(|(key, value)| (key, canonicalize(value)))
            .collect(),
    )
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "casts are guarded by an exact integral check and range bounds"
)]
fn canonicalize_number(number: Number) -> Number {
    let Some(float) = number.as_f64().filter(|_| number.is_f64()) else {
        return number;
    };
    if float.fract() != 0.0 {
        return number;
    }
    if float >= i64::MIN as f64 && float < i64::MAX as f64 {
        return Number::from(float as i64);
    }
    if float >= 0.0 && float < u64::MAX as f64 {
        return Number::from(float as u64);
    }
    number
}

/// Human-readable name of a value's kind, used in error messages.
#[must_use]
pub const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Compact single-line rendering of `value`, truncated for diagnostics.
#[must_use]
pub fn summarize(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= SUMMARY_LIMIT {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(SUMMARY_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

/// Whether `value` is a map holding `key`.
#[must_use]
pub fn has_key(value: &Value, key: &str) -> bool {
    value.as_object().is_some_and(|map| map.contains_key(key))
}
