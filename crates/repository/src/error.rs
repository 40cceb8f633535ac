//! Repository Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A repository error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Object, datastream, relation or file URL does not exist.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The repository could not be reached.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The repository rejected the request (bad PID, wrong object type, ...).
    #[display("invalid resource: {_0}")]
    InvalidResource(#[error(not(source))] String),
    /// A datastream's content is not well-formed XML.
    #[display("malformed document: {_0}")]
    MalformedDocument(#[error(not(source))] String),
    /// Client-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::BackendError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::Network("timeout".into()).is_retryable());
        assert!(!ErrorKind::NotFound("uuid:1".into()).is_retryable());
        assert!(!ErrorKind::MalformedDocument("DC".into()).is_retryable());
    }
}
