use crate::consts;
use crate::xml::XPath;
use derive_more::Display;

/// One of the metadata sub-trees of a program record that is stored as its
/// own datastream on the program object.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fragment {
    /// The PBCore description document.
    #[display("PBCore")]
    Pbcore,
    /// Original Ritzau listing data.
    #[display("Ritzau")]
    Ritzau,
    /// Original Gallup (TV-meter) data.
    #[display("Gallup")]
    Gallup,
    /// Broadcast time and channel information.
    #[display("Broadcast")]
    Broadcast,
}
impl Fragment {
    pub const ALL: [Fragment; 4] = [Self::Pbcore, Self::Ritzau, Self::Gallup, Self::Broadcast];

    /// Identifier of the datastream this fragment is written to.
    pub fn datastream_id(&self) -> &'static str {
        match self {
            Self::Pbcore => "PBCORE",
            Self::Ritzau => "RITZAU_ORIGINAL",
            Self::Gallup => "GALLUP_ORIGINAL",
            Self::Broadcast => "PROGRAM_BROADCAST",
        }
    }

    pub(crate) fn path(&self) -> &'static XPath {
        match self {
            Self::Pbcore => &consts::PBCORE_PATH,
            Self::Ritzau => &consts::RITZAU_PATH,
            Self::Gallup => &consts::GALLUP_PATH,
            Self::Broadcast => &consts::BROADCAST_PATH,
        }
    }

    pub(crate) fn field(&self) -> &'static str {
        match self {
            Self::Pbcore => "pbcore",
            Self::Ritzau => "ritzau_original",
            Self::Gallup => "gallup_original",
            Self::Broadcast => "programBroadcast",
        }
    }
}
