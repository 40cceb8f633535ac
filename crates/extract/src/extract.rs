//! Extraction of [`Program`] data from a parsed program record.

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{Fragment, Fragments, IdentifierSource, Program};
use crate::xml::{Document, Element};
use exn::OptionExt;
use tracing::instrument;

/// Read-only view over a program record.
///
/// The record itself belongs to the caller; an [`Extractor`] only ever
/// borrows it, so it's cheap to create one per ingest.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    document: &'a Document,
}
impl<'a> Extractor<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Extracts everything at once, failing on the first missing field.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MissingField`] if the record has no PBCore
    /// description document, no `titel` title, or lacks one of the four
    /// datastream fragments.
    #[instrument(skip(self), fields(title = tracing::field::Empty))]
    pub fn program(&self) -> Result<Program> {
        let program = Program {
            file_urls: self.file_urls(),
            old_identifiers: self.old_identifiers()?,
            title: self.title()?,
            fragments: Fragments {
                pbcore: self.fragment(Fragment::Pbcore)?,
                ritzau: self.fragment(Fragment::Ritzau)?,
                gallup: self.fragment(Fragment::Gallup)?,
                broadcast: self.fragment(Fragment::Broadcast)?,
            },
        };
        tracing::Span::current().record("title", program.title.as_str());
        Ok(program)
    }

    /// Text of every `program/fileUrls/fileUrl`, untouched.
    pub fn file_urls(&self) -> Vec<String> {
        self.document.select(&consts::FILE_URL_PATH).into_iter().map(Element::text).collect()
    }

    /// Legacy identifiers in [`IdentifierSource`] order. Empty values are
    /// skipped, as are repeats.
    pub fn old_identifiers(&self) -> Result<Vec<String>> {
        let pbcore = self.pbcore()?;
        let mut identifiers: Vec<String> = Vec::new();
        for source in IdentifierSource::ALL {
            let Some(identifier) = pbcore.select_first(source.path()).map(Element::text) else {
                continue;
            };
            if !identifier.is_empty() && !identifiers.contains(&identifier) {
                identifiers.push(identifier);
            }
        }
        Ok(identifiers)
    }

    /// The first PBCore title whose type is `titel`.
    pub fn title(&self) -> Result<String> {
        self.document
            .select_first(&consts::TITLE_PATH)
            .map(Element::text)
            .ok_or_raise(|| ErrorKind::MissingField("title"))
    }

    /// The sub-tree for `fragment`, as a standalone document.
    pub fn fragment(&self, fragment: Fragment) -> Result<Document> {
        self.document
            .select_first(fragment.path())
            .map(|element| Document::new(element.clone()))
            .ok_or_raise(|| ErrorKind::MissingField(fragment.field()))
    }

    fn pbcore(&self) -> Result<&'a Element> {
        self.document.select_first(&consts::PBCORE_PATH).ok_or_raise(|| ErrorKind::MissingField("pbcore"))
    }
}
impl<'a> From<&'a Document> for Extractor<'a> {
    fn from(document: &'a Document) -> Self {
        Self::new(document)
    }
}

impl TryFrom<&Document> for Program {
    type Error = crate::error::Error;
    fn try_from(document: &Document) -> Result<Self> {
        Extractor::new(document).program()
    }
}
