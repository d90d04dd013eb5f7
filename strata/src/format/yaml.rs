//! YAML codec backed by `serde_yaml`.

use serde::Deserialize;
use serde_json::Value;

use super::{Format, join_encoded};
use crate::error::{StrataError, StrataResult};
use crate::value::canonicalize;

const DOCUMENT_SEPARATOR: &str = "---\n";

/// YAML documents; streams are separated by `---`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl Format for Yaml {
    fn decode(&self, input: &str) -> StrataResult<Vec<Value>> {
        serde_yaml::Deserializer::from_str(input)
            .map(|document| {
                Value::deserialize(document)
                    .map(canonicalize)
                    .map_err(|err| StrataError::decode("yaml", err))
            })
            .collect()
    }

    fn encode(&self, value: &Value) -> StrataResult<String> {
        serde_yaml::to_string(value).map_err(|err| StrataError::encode("yaml", err))
    }

    fn encode_stream(&self, values: &[Value]) -> StrataResult<String> {
        join_encoded(values, DOCUMENT_SEPARATOR, |value| self.encode(value))
    }
}
