//! Ingests RadioTV program records into a digital-object repository.
//!
//! A program record describes one broadcast: its PBCore metadata, the
//! original Ritzau and Gallup listings, broadcast details and the URLs of
//! the recorded files. [`RecordCreator::ingest_program`] turns a record into
//! a program object: created from a template the first time, updated in
//! place afterwards (found again by the record's old identifiers), with its
//! has-file relations pointing at exactly the record's file objects.
//!
//! [`ingest`] does the same for a batch of records, streaming progress.

mod comment;
mod context;
mod creator;
pub mod error;
mod files;
mod identifiers;
mod identity;
mod relations;
mod stream;

pub use crate::comment::Commenter;
pub use crate::context::Context;
pub use crate::creator::{Ingested, Outcome, RecordCreator};
pub use crate::identity::{Equivalence, Field};
pub use crate::relations::RelationChanges;
pub use crate::stream::{IngestEvent, Record, ingest};
