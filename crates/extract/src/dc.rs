//! Identifier handling for the repository's Dublin Core (`DC`) datastream.

use crate::consts::{self, DC_NAMESPACE};
use crate::xml::{Document, Element, Node, QName};

/// Text of every `dc:identifier` in the document, in document order.
pub fn identifiers(dc: &Document) -> Vec<String> {
    dc.select(&consts::DC_IDENTIFIER_PATH).into_iter().map(Element::text).collect()
}

/// Adds each of `wanted` that the document doesn't already list as a
/// `dc:identifier` (exact string match).
///
/// New elements are inserted, in the order given, directly before the first
/// existing identifier. A document without any identifier gets them appended
/// to its root element instead. Returns the identifiers that were added; an
/// empty result means the document is unchanged.
pub fn add_identifiers(dc: &mut Document, wanted: &[String]) -> Vec<String> {
    let existing = identifiers(dc);
    let mut missing: Vec<String> = Vec::new();
    for identifier in wanted {
        if !existing.contains(identifier) && !missing.contains(identifier) {
            missing.push(identifier.clone());
        }
    }
    if missing.is_empty() {
        return missing;
    }

    let name = QName::namespaced(DC_NAMESPACE, "identifier");
    let nodes: Vec<Node> = missing
        .iter()
        .map(|identifier| Element::new(name.clone()).with_prefix("dc").with_child(identifier.as_str()).into())
        .collect();
    if let Err(nodes) = dc.root_mut().insert_before_first(&name, nodes) {
        dc.root_mut().children.extend(nodes);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    const DC: &str = r#"<oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/" xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>Title</dc:title>
        <dc:identifier>uuid:1234</dc:identifier>
        <dc:identifier>old-1</dc:identifier>
    </oai_dc:dc>"#;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identifiers() {
        let dc: Document = DC.parse().unwrap();
        assert_eq!(identifiers(&dc), ["uuid:1234", "old-1"]);
    }

    #[test]
    fn test_adds_missing_before_first_identifier() {
        let mut dc: Document = DC.parse().unwrap();
        let added = add_identifiers(&mut dc, &ids(&["old-1", "old-2", "old-3", "old-2"]));
        assert_eq!(added, ["old-2", "old-3"]);
        assert_eq!(identifiers(&dc), ["old-2", "old-3", "uuid:1234", "old-1"]);
        // The title stays in front.
        assert_eq!(dc.root().elements().next().unwrap().name.local, "title");
    }

    #[test]
    fn test_nothing_missing_leaves_document_untouched() {
        let mut dc: Document = DC.parse().unwrap();
        let before = dc.clone();
        assert!(add_identifiers(&mut dc, &ids(&["old-1", "uuid:1234"])).is_empty());
        assert_eq!(dc, before);
    }

    #[test]
    fn test_appends_when_no_identifier_exists() {
        let mut dc: Document =
            r#"<oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"/>"#.parse().unwrap();
        add_identifiers(&mut dc, &ids(&["old-1"]));
        assert_eq!(identifiers(&dc), ["old-1"]);
        let reparsed: Document = dc.to_xml_string().unwrap().parse().unwrap();
        assert_eq!(identifiers(&reparsed), ["old-1"]);
    }
}
