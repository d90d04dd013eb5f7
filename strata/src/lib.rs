//! Core crate for the `strata` layered configuration language.
//!
//! A configuration is a stack of documents in JSON, YAML or TOML. Later
//! layers patch earlier ones through a deep [`merge`], a layer may name the
//! layer it overrides with `$parent`, and a handful of `$`-prefixed
//! directives reuse and reshape values before anything is emitted:
//!
//! - `$merge` and `$replace` pull in another subtree, from the same document
//!   or from a sibling selected by index or by `$match` pattern;
//! - `$output` decides which maps become output objects;
//! - `$encode` embeds a subtree as an encoded string;
//! - `$patch: replace` and `null` values control how a patch lands.
//!
//! The [`Session`] type drives all of this. [`intersect`] and [`subtract`]
//! go the other way, deriving a shared base layer or a minimal override
//! layer from concrete configurations.
//!
//! ```
//! use serde_json::json;
//! use strata::Session;
//!
//! let mut session = Session::new();
//! session.apply_patch(0, json!({"defaults": {"replicas": 1}, "app": {"$output": true, "$merge": "defaults", "name": "web"}}))?;
//! assert_eq!(session.output("json")?, "{\"name\":\"web\",\"replicas\":1}\n");
//! # Ok::<_, strata::StrataError>(())
//! ```

pub mod diff;
pub mod directive;
pub mod document;
mod error;
pub mod file;
pub mod format;
mod merge;
pub mod output;
pub mod process;
pub mod required;
pub mod session;
pub mod value;

pub use diff::{DiffOptions, intersect, subtract};
pub use document::{Document, DocumentId};
pub use error::{StrataError, StrataResult, StrataResultExt};
pub use format::{Format, FormatRegistry};
pub use merge::merge;
pub use session::Session;
pub use value::canonicalize;

pub use serde_json;
/// The dynamic value every document is made of.
pub use serde_json::Value;
