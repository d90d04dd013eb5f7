//! Error types for the `strata` command-line tools.

use camino::Utf8PathBuf;
use strata::StrataError;
use thiserror::Error;

/// Errors surfaced by the command-line tools.
#[derive(Debug, Error)]
pub enum StrataCliError {
    /// The configuration engine rejected the input.
    #[error(transparent)]
    Strata(#[from] StrataError),

    /// A diff input held more or fewer than one document.
    #[error("{path}: expected exactly one document, found {count}")]
    DocumentCount {
        /// Input that was loaded.
        path: Utf8PathBuf,
        /// Number of documents it produced.
        count: usize,
    },

    /// The wrapper could not tell which tool to run.
    #[error("usage: strata-wrap TOOL [ARGS...], or symlink <tool>-strata to strata-wrap")]
    MissingTool,

    /// The wrapped tool could not be started.
    #[error("failed to run '{tool}': {source}")]
    Spawn {
        /// Tool that was invoked.
        tool: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing to standard output failed.
    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}
