use crate::consts;
use crate::xml::XPath;
use derive_more::Display;

/// Legacy systems whose identifiers are carried in the PBCore identifier list.
///
/// Variants are listed in lookup order: an existing program is searched for
/// by its Ritzau identifier before its Gallup one.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierSource {
    /// `pbcoreIdentifier` with `identifierSource` = `id`.
    #[display("id")]
    Ritzau,
    /// `pbcoreIdentifier` with `identifierSource` = `tvmeter`.
    #[display("tvmeter")]
    Gallup,
}
impl IdentifierSource {
    pub const ALL: [IdentifierSource; 2] = [Self::Ritzau, Self::Gallup];

    pub(crate) fn path(&self) -> &'static XPath {
        match self {
            Self::Ritzau => &consts::RITZAU_ID_PATH,
            Self::Gallup => &consts::GALLUP_ID_PATH,
        }
    }
}
