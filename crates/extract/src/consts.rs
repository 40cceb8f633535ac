use crate::xml::{Namespaces, XPath};
use std::sync::LazyLock;

/// Dublin Core elements, used by the repository's `DC` datastream.
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const PBCORE_NAMESPACE: &str = "http://www.pbcore.org/PBCore/PBCoreNamespace.html";
pub const RITZAU_NAMESPACE: &str = "http://doms.statsbiblioteket.dk/types/ritzau_original/0/1/#";
pub const GALLUP_NAMESPACE: &str = "http://doms.statsbiblioteket.dk/types/gallup_original/0/1/#";
pub const BROADCAST_NAMESPACE: &str = "http://doms.statsbiblioteket.dk/types/program_broadcast/0/1/#";

/// Prefixes available to every path expression in this crate.
pub static NAMESPACES: LazyLock<Namespaces> = LazyLock::new(|| {
    Namespaces::new()
        .with("dc", DC_NAMESPACE)
        .with("pbc", PBCORE_NAMESPACE)
        .with("ritzau", RITZAU_NAMESPACE)
        .with("gallup", GALLUP_NAMESPACE)
        .with("pb", BROADCAST_NAMESPACE)
});

macro_rules! xpath {
    ($name:ident, $expr:expr) => {
        pub(crate) static $name: LazyLock<XPath> = LazyLock::new(|| XPath::parse($expr, &NAMESPACES).unwrap());
    };
}

xpath!(FILE_URL_PATH, "//program/fileUrls/fileUrl");
xpath!(PBCORE_PATH, "//program/pbcore/pbc:PBCoreDescriptionDocument");
xpath!(TITLE_PATH, r#"//pbc:pbcoreTitle[pbc:titleType="titel"]/pbc:title"#);
// Relative to the PBCore description document.
xpath!(RITZAU_ID_PATH, r#"pbc:pbcoreIdentifier[pbc:identifierSource="id"]/pbc:identifier"#);
xpath!(GALLUP_ID_PATH, r#"pbc:pbcoreIdentifier[pbc:identifierSource="tvmeter"]/pbc:identifier"#);
xpath!(RITZAU_PATH, "//program/originals/ritzau:ritzau_original");
xpath!(GALLUP_PATH, "//program/originals/gallup:gallup_original | //program/originals/gallup:tvmeterProgram");
xpath!(BROADCAST_PATH, "//program/pb:programBroadcast");
xpath!(DC_IDENTIFIER_PATH, "//dc:identifier");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_paths_compile() {
        for path in [
            &FILE_URL_PATH,
            &PBCORE_PATH,
            &TITLE_PATH,
            &RITZAU_ID_PATH,
            &GALLUP_ID_PATH,
            &RITZAU_PATH,
            &GALLUP_PATH,
            &BROADCAST_PATH,
            &DC_IDENTIFIER_PATH,
        ] {
            assert!(!LazyLock::force(path).as_str().is_empty());
        }
    }
}
