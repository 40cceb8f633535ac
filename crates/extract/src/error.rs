//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The XML is not well-formed (or uses an undeclared namespace prefix).
    #[display("malformed XML: {_0}")]
    MalformedXml(#[error(not(source))] String),
    /// A path expression could not be parsed.
    #[display("invalid path expression '{expression}': {reason}")]
    InvalidPath {
        /// The offending expression.
        expression: String,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// A required element could not be found in the program record.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// The tree could not be written back out as XML.
    #[display("failed to serialize XML")]
    Serialize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The document is either valid or it isn't, retrying changes nothing.
        false
    }
}
