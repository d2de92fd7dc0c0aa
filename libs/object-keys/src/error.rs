//! Error types for key construction and selection.

use thiserror::Error;

/// Errors raised while building key components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The source name is empty once whitespace is removed.
    #[error("source identifier cannot be empty")]
    EmptySource,

    /// The bucket name is empty.
    #[error("bucket name cannot be empty")]
    EmptyBucket,
}

/// Reasons no object could be selected from a listing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The listing contained no keys at all.
    #[error("listing is empty")]
    Empty,

    /// The newest key is a marker-only object and nothing ranks below it.
    #[error("only a marker-only object is present ({key})")]
    OnlyMarker { key: String },
}

impl SelectError {
    /// Returns true if the listing had no keys.
    pub fn is_empty(&self) -> bool {
        matches!(self, SelectError::Empty)
    }
}
