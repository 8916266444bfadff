//! Error types for Rivulet.

use alloc::string::String;
use thiserror::Error;

/// Result type alias for Rivulet operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Invariant violations and configuration errors.
///
/// These indicate a bug in the calling code rather than a runtime condition;
/// the operation that produced one has not changed any state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A key is already present in a keyed collection.
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },
    /// A position is outside a collection's bounds.
    #[error("position {position} out of bounds (len {len})")]
    OutOfBounds { position: usize, len: usize },
    /// A classifier returned a section index that does not exist.
    #[error("section {section} out of range ({sections} sections)")]
    SectionOutOfRange { section: usize, sections: usize },
    /// A union was constructed without sources.
    #[error("union requires at least one source")]
    NoSources,
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Creates a duplicate key error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Error::DuplicateKey { key: key.into() }
    }

    /// Creates an out of bounds error.
    pub fn out_of_bounds(position: usize, len: usize) -> Self {
        Error::OutOfBounds { position, len }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}

/// A backend or transport failure.
///
/// Delivered to observers through `InitialLoadFinished` and to pagination
/// callers through the `fetch_more` completion. The stream never retries.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("fetch failed: {message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    /// Creates a fetch error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
