//! JSON codecs backed by `serde_json`.

use serde_json::Value;

use super::Format;
use crate::error::{StrataError, StrataResult};
use crate::value::canonicalize;

/// Compact JSON; streams hold one document per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

/// Indented JSON; streams hold one document after another.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPretty;

fn decode_json(input: &str) -> StrataResult<Vec<Value>> {
    serde_json::Deserializer::from_str(input)
        .into_iter::<Value>()
        .map(|document| {
            document
                .map(canonicalize)
                .map_err(|err| StrataError::decode("json", err))
        })
        .collect()
}

fn with_newlines<F>(values: &[Value], encode: F) -> StrataResult<String>
where
    F: Fn(&Value) -> StrataResult<String>,
{
    let mut stream = String::new();
    for value in values {
        stream.push_str(&encode(value)?);
        stream.push('\n');
    }
    Ok(stream)
}

impl Format for Json {
    fn decode(&self, input: &str) -> StrataResult<Vec<Value>> {
        decode_json(input)
    }

    fn encode(&self, value: &Value) -> StrataResult<String> {
        serde_json::to_string(value).map_err(|err| StrataError::encode("json", err))
    }

    fn encode_stream(&self, values: &[Value]) -> StrataResult<String> {
        with_newlines(values, |value| self.encode(value))
    }
}

impl Format for JsonPretty {
    fn decode(&self, input: &str) -> StrataResult<Vec<Value>> {
        decode_json(input)
    }

    fn encode(&self, value: &Value) -> StrataResult<String> {
        serde_json::to_string_pretty(value).map_err(|err| StrataError::encode("json-pretty", err))
    }

    fn encode_stream(&self, values: &[Value]) -> StrataResult<String> {
        with_newlines(values, |value| self.encode(value))
    }
}
