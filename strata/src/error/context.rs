//! Context wrapping for errors raised deep inside recursive walks.
//!
//! Every recursive frame of merge, processing and loading annotates a failure
//! with its local position before handing it to its caller, producing messages
//! such as `[base.yaml:doc0]: spec: ports: 2: cannot merge list into map`.
//!
//! # Examples
//!
//! ```
//! use strata::{StrataError, StrataResult, StrataResultExt};
//!
//! fn inner() -> StrataResult<()> {
//!     Err(StrataError::TypeMismatch { dst: "map", src: "list" })
//! }
//!
//! let err = inner().context("spec").context("[base.yaml:doc0]").unwrap_err();
//! assert_eq!(err.to_string(), "[base.yaml:doc0]: spec: cannot merge list into map");
//! assert!(matches!(err.root_cause(), StrataError::TypeMismatch { .. }));
//! ```

use std::fmt::Display;

use super::StrataError;

impl StrataError {
    /// Wrap `self` with a location label.
    #[must_use]
    pub fn with_context(self, context: impl Display) -> Self {
        Self::Context {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// Strip every [`StrataError::Context`] layer and return the failure
    /// underneath.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Location labels from outermost to innermost.
    #[must_use]
    pub fn context_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let Self::Context { context, source } = current {
            chain.push(context.as_str());
            current = source;
        }
        chain
    }
}

/// Extension for annotating `StrataResult` failures concisely.
pub trait StrataResultExt<T> {
    /// Wrap an error with `context`, leaving successes untouched.
    ///
    /// # Errors
    ///
    /// Propagates the original error wrapped in [`StrataError::Context`].
    fn context(self, context: impl Display) -> Result<T, StrataError>;

    /// Lazily computed variant of [`StrataResultExt::context`].
    ///
    /// # Errors
    ///
    /// Propagates the original error wrapped in [`StrataError::Context`].
    fn with_context<C, F>(self, f: F) -> Result<T, StrataError>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T> StrataResultExt<T> for Result<T, StrataError> {
    fn context(self, context: impl Display) -> Self {
        self.map_err(|err| err.with_context(context))
    }

    fn with_context<C, F>(self, f: F) -> Self
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_context(f()))
    }
}
