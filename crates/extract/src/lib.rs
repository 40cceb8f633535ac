//! Parsing, querying and extraction for RadioTV program records.
//!
//! A program record is an XML document bundling PBCore metadata, the original
//! Ritzau and Gallup listings, broadcast information and the URLs of the
//! recorded files. This crate turns such a record into a [`Program`], cutting
//! out the standalone documents that are stored as datastreams, and provides
//! the [structural comparison](diff) used to decide whether a stored
//! datastream already matches.

mod compare;
mod consts;
pub mod dc;
pub mod error;
mod extract;
pub mod models;
pub mod xml;

pub use crate::compare::{Difference, DifferenceKind, diff};
pub use crate::consts::{
    BROADCAST_NAMESPACE, DC_NAMESPACE, GALLUP_NAMESPACE, NAMESPACES, PBCORE_NAMESPACE, RITZAU_NAMESPACE,
};
use crate::error::Result;
pub use crate::extract::Extractor;
use crate::models::Program;
use crate::xml::Document;
use tracing::instrument;

/// Easy, top-level entrypoint: parse raw XML bytes and extract the
/// [`Program`] from them.
#[instrument(skip(xml), fields(xml_size = xml.as_ref().len()))]
pub fn extract(xml: impl AsRef<[u8]>) -> Result<Program> {
    let document = Document::parse(xml)?;
    Extractor::new(&document).program()
}
