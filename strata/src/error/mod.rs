//! Error types produced by the layering engine.

mod constructors;
mod context;
mod types;

pub use context::StrataResultExt;
pub use types::StrataError;

/// Result alias used throughout the crate.
pub type StrataResult<T> = Result<T, StrataError>;
