//! Ingest Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Failures from the extract and
//! repository crates are kept as children in the error tree.

use derive_more::{Display, Error};
use radiotv_repository::Pid;

/// An ingest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ingest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why a program record could not be ingested.
///
/// ### Record Errors
/// Fixing these means fixing the program record (or the repository's file
/// objects); retrying as-is will fail the same way.
/// - [`ErrorKind::Metadata`]
/// - [`ErrorKind::MalformedUrl`]
/// - [`ErrorKind::FileNotFound`]
/// - [`ErrorKind::OverwriteForbidden`]
///
/// ### Dependency Errors
/// - [`ErrorKind::ObjectLookup`]
/// - [`ErrorKind::Repository`]
/// - [`ErrorKind::Template`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The program record is not well-formed or lacks a required element.
    #[display("program record is missing required metadata")]
    Metadata,
    /// A `fileUrl` entry is not an absolute URL.
    #[display("malformed file URL: {_0}")]
    MalformedUrl(#[error(not(source))] String),
    /// No file object is registered for a `fileUrl` entry.
    #[display("no file object for URL: {_0}")]
    FileNotFound(#[error(not(source))] String),
    /// Searching for an existing program object by old identifier failed.
    #[display("could not look up existing program object")]
    ObjectLookup,
    /// A program object already exists and overwriting is disabled.
    #[display("found existing object '{_0}' and overwrite is disabled")]
    OverwriteForbidden(#[error(not(source))] Pid),
    /// A repository call failed while creating or updating the object.
    #[display("repository operation failed")]
    Repository,
    /// The audit comment template could not be compiled or rendered.
    #[display("issue with audit comment template")]
    Template,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Datastream writes and relation reconciliation are idempotent, so a
    /// partially applied ingest can always be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ObjectLookup | Self::Repository)
    }
}
