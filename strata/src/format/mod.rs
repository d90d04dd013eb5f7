//! Encoders and decoders keyed by format name.
//!
//! The engine never reaches for a global format table: callers hand a
//! [`FormatRegistry`] to the session and the processor, so tests and embedders
//! can register their own formats or restrict the built-in ones.

mod json;
#[cfg(feature = "toml")]
mod toml_format;
#[cfg(feature = "yaml")]
mod yaml;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use serde_json::Value;

use crate::error::{StrataError, StrataResult};

pub use json::{Json, JsonPretty};
#[cfg(feature = "toml")]
pub use toml_format::Toml;
#[cfg(feature = "yaml")]
pub use yaml::Yaml;

/// Format used when writing output without an explicit choice.
pub const DEFAULT_OUTPUT_FORMAT: &str = "json-pretty";

/// A text format able to read and write value trees.
pub trait Format: Send + Sync {
    /// Decode every document contained in `input`.
    ///
    /// Decoded trees are canonicalised before they are returned.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Decode`] when `input` is malformed.
    fn decode(&self, input: &str) -> StrataResult<Vec<Value>>;

    /// Encode a single document.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Encode`] when `value` cannot be represented.
    fn encode(&self, value: &Value) -> StrataResult<String>;

    /// Encode several documents into one stream.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Encode`] when any document cannot be
    /// represented, or the format cannot hold several documents.
    fn encode_stream(&self, values: &[Value]) -> StrataResult<String>;
}

/// Formats addressable by name or file extension.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: BTreeMap<String, Arc<dyn Format>>,
}

impl FormatRegistry {
    /// A registry without any formats.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            formats: BTreeMap::new(),
        }
    }

    /// The built-in formats: `json`, `json-pretty`, and (behind their default
    /// features) `yaml`, `yml` and `toml`.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("json", Arc::new(Json));
        registry.register("json-pretty", Arc::new(JsonPretty));
        #[cfg(feature = "yaml")]
        {
            registry.register("yaml", Arc::new(Yaml));
            registry.register("yml", Arc::new(Yaml));
        }
        #[cfg(feature = "toml")]
        registry.register("toml", Arc::new(Toml));
        registry
    }

    /// Register `format` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, format: Arc<dyn Format>) {
        self.formats.insert(name.into(), format);
    }

    /// Look up the format registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::UnknownFormat`] when nothing is registered under
    /// `name`.
    pub fn get(&self, name: &str) -> StrataResult<Arc<dyn Format>> {
        self.formats
            .get(name)
            .cloned()
            .ok_or_else(|| StrataError::UnknownFormat {
                name: name.to_owned(),
            })
    }

    /// Whether a format is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Lower-cased extension of `path` without the leading dot.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use strata::format::extension;
///
/// assert_eq!(extension(Utf8Path::new("deploy/app.prod.YAML")).as_deref(), Some("yaml"));
/// assert_eq!(extension(Utf8Path::new("Makefile")), None);
/// ```
#[must_use]
pub fn extension(path: &Utf8Path) -> Option<String> {
    path.extension().map(str::to_ascii_lowercase)
}

/// Join encoded documents, failing on the first document that cannot be
/// encoded.
#[cfg(feature = "yaml")]
fn join_encoded<F>(values: &[Value], separator: &str, encode: F) -> StrataResult<String>
where
    F: Fn(&Value) -> StrataResult<String>,
{
    let encoded = values.iter().map(encode).collect::<StrataResult<Vec<_>>>()?;
    Ok(encoded.join(separator))
}
