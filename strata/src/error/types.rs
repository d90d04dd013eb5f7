//! Primary error enum for merge, processing and diff flows.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while layering, processing or diffing documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StrataError {
    /// `$patch` carried something other than a string.
    #[error("$patch must be a string, found {found}")]
    InvalidPatchType {
        /// Kind of the offending value.
        found: &'static str,
    },

    /// `$patch` carried a string other than `replace`.
    #[error("unknown $patch value '{value}'")]
    InvalidPatchValue {
        /// The unrecognised patch value.
        value: String,
    },

    /// `$merge` or `$replace` referenced something that is not a path or
    /// document selector.
    #[error("{directive} must be a path or document selector, found {found}")]
    InvalidMergeType {
        /// Directive holding the reference.
        directive: &'static str,
        /// Kind of the offending value.
        found: &'static str,
    },

    /// A directive carried a value it does not understand.
    #[error("invalid value for {directive}: {message}")]
    InvalidDirectiveValue {
        /// Directive holding the value.
        directive: &'static str,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A document index was out of range.
    #[error("document index {index} out of range (session holds {len})")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of documents available.
        len: usize,
    },

    /// `$match` did not match any document.
    #[error("no document matches {pattern}")]
    NoMatchFound {
        /// Rendered pattern.
        pattern: String,
    },

    /// `$merge` target could not be resolved.
    #[error("$merge reference not found: {path}")]
    MergeReferenceNotFound {
        /// Path that failed to resolve.
        path: String,
    },

    /// `$replace` target could not be resolved.
    #[error("$replace reference not found: {path}")]
    ReplaceReferenceNotFound {
        /// Path that failed to resolve.
        path: String,
    },

    /// Directive evaluation exceeded the depth ceiling.
    #[error("circular reference (depth limit {limit} exceeded) at {value}")]
    CircularReference {
        /// Depth ceiling that was exceeded.
        limit: usize,
        /// Truncated rendering of the node being processed.
        value: String,
    },

    /// Merge or diff recursion exceeded the depth ceiling.
    #[error("document nesting exceeds depth limit {limit}")]
    DepthExceeded {
        /// Depth ceiling that was exceeded.
        limit: usize,
    },

    /// Two incompatible values met during a merge.
    #[error("cannot merge {src} into {dst}")]
    TypeMismatch {
        /// Kind of the destination value.
        dst: &'static str,
        /// Kind of the source value.
        src: &'static str,
    },

    /// No format is registered under the requested name.
    #[error("unknown format '{name}'")]
    UnknownFormat {
        /// Requested format name.
        name: String,
    },

    /// Encoding a value failed.
    #[error("failed to encode {format}: {source}")]
    Encode {
        /// Format being produced.
        format: String,
        /// Underlying encoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Decoding input failed.
    #[error("failed to decode {format}: {source}")]
    Decode {
        /// Format being read.
        format: String,
        /// Underlying decoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Writing an output file failed.
    #[error("failed to write output file '{path}': {source}")]
    OutputFile {
        /// Target path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing an output stream failed.
    #[error("failed to write output: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Error originating from a layer file.
    #[error("layer file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: Utf8PathBuf,
        /// Underlying error reported by the loader.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `$parent` carried an unusable value.
    #[error("invalid $parent in '{path}': {message}")]
    InvalidParent {
        /// Layer declaring the parent.
        path: Utf8PathBuf,
        /// Human-readable description of the problem.
        message: String,
    },

    /// Cycle detected while resolving `$parent`.
    #[error("cyclic $parent chain detected: {cycle}")]
    CyclicParent {
        /// Chain of layer files participating in the cycle.
        cycle: String,
    },

    /// A directive survived processing and output selection.
    #[error("unexpected directive {directive} at {path}")]
    LeftoverDirective {
        /// Location of the directive.
        path: String,
        /// The directive key.
        directive: String,
    },

    /// A `$required` marker was never overridden.
    #[error("required value missing at {path}")]
    RequiredValueMissing {
        /// Location of the marker.
        path: String,
    },

    /// Failure annotated with the location it occurred at.
    #[error("{context}: {source}")]
    Context {
        /// File, document, key or index describing where the failure happened.
        context: String,
        /// The wrapped failure.
        #[source]
        source: Box<StrataError>,
    },
}
