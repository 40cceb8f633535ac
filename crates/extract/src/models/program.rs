use super::Fragment;
use crate::xml::Document;

/// Everything the ingester needs from a single program record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// File URLs exactly as written in the record, in document order.
    pub file_urls: Vec<String>,
    /// Non-empty legacy identifiers, in lookup order.
    pub old_identifiers: Vec<String>,
    /// PBCore title of type `titel`.
    pub title: String,
    pub fragments: Fragments,
}

/// The four standalone datastream documents cut out of a program record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    pub pbcore: Document,
    pub ritzau: Document,
    pub gallup: Document,
    pub broadcast: Document,
}
impl Fragments {
    pub fn get(&self, fragment: Fragment) -> &Document {
        match fragment {
            Fragment::Pbcore => &self.pbcore,
            Fragment::Ritzau => &self.ritzau,
            Fragment::Gallup => &self.gallup,
            Fragment::Broadcast => &self.broadcast,
        }
    }

    /// Fragments paired with their documents, in datastream write order.
    pub fn iter(&self) -> impl Iterator<Item = (Fragment, &Document)> {
        Fragment::ALL.into_iter().map(|fragment| (fragment, self.get(fragment)))
    }
}
