//! Constructors shared by loaders and encoders.

use std::error::Error;

use camino::Utf8Path;

use super::StrataError;

impl StrataError {
    /// Construct a [`StrataError::File`] for a layer path.
    #[must_use]
    pub fn file(path: &Utf8Path, err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::File {
            path: path.to_path_buf(),
            source: err.into(),
        }
    }

    /// Construct a [`StrataError::Encode`] for `format`.
    #[must_use]
    pub fn encode(format: &str, err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Encode {
            format: format.to_owned(),
            source: err.into(),
        }
    }

    /// Construct a [`StrataError::Decode`] for `format`.
    #[must_use]
    pub fn decode(format: &str, err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Decode {
            format: format.to_owned(),
            source: err.into(),
        }
    }

    /// Construct a [`StrataError::InvalidParent`].
    #[must_use]
    pub fn invalid_parent(path: &Utf8Path, message: impl Into<String>) -> Self {
        Self::InvalidParent {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
