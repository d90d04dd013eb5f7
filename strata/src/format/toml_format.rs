//! TOML codec backed by `toml`.
//!
//! A TOML file always holds exactly one table, so decoding yields a single
//! document and encoding refuses streams of more than one.

use serde_json::Value;

use super::Format;
use crate::error::{StrataError, StrataResult};
use crate::value::canonicalize;

/// A single TOML table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Toml;

impl Format for Toml {
    fn decode(&self, input: &str) -> StrataResult<Vec<Value>> {
        let table: Value =
            toml::from_str(input).map_err(|err| StrataError::decode("toml", err))?;
        Ok(vec![canonicalize(table)])
    }

    fn encode(&self, value: &Value) -> StrataResult<String> {
        toml::to_string(value).map_err(|err| StrataError::encode("toml", err))
    }

    fn encode_stream(&self, values: &[Value]) -> StrataResult<String> {
        match values {
            [] => Ok(String::new()),
            [value] => self.encode(value),
            _ => Err(StrataError::encode(
                "toml",
                format!("a TOML file holds one document, got {}", values.len()),
            )),
        }
    }
}
