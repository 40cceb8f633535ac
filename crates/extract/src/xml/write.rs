use super::{Element, Node};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A prefix bound to a namespace URI (`None` prefix is the default namespace,
/// `None` URI undeclares it).
type Binding = (Option<String>, Option<String>);

pub(super) fn write(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .or_raise(|| ErrorKind::Serialize)?;
    let mut scope = Vec::new();
    write_element(&mut writer, root, &mut scope)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element, scope: &mut Vec<Binding>) -> Result<()> {
    let mark = scope.len();

    // An element without a namespace can't carry a prefix.
    let prefix = element.name.namespace.as_ref().and_then(|_| element.prefix.clone());
    let qualified = qualify(prefix.as_deref(), &element.name.local);
    let mut declarations = Vec::new();
    for declared in &element.declarations {
        let uri = Some(declared.uri.as_str()).filter(|uri| !uri.is_empty());
        // The element's own name decides what its prefix is bound to, and
        // only the default namespace can be undeclared.
        if (declared.prefix == prefix && uri != element.name.namespace.as_deref())
            || (declared.prefix.is_some() && uri.is_none())
        {
            continue;
        }
        if lookup(scope, declared.prefix.as_deref()) != uri {
            let binding = (declared.prefix.clone(), uri.map(str::to_string));
            declarations.push(declaration(&binding));
            scope.push(binding);
        }
    }
    if lookup(scope, prefix.as_deref()) != element.name.namespace.as_deref() {
        let binding = (prefix.clone(), element.name.namespace.clone());
        declarations.push(declaration(&binding));
        scope.push(binding);
    }

    let mut attributes = Vec::with_capacity(element.attributes.len());
    for (index, attribute) in element.attributes.iter().enumerate() {
        let Some(namespace) = attribute.name.namespace.as_deref() else {
            attributes.push((attribute.name.local.clone(), attribute.value.as_str()));
            continue;
        };
        if namespace == XML_NAMESPACE {
            attributes.push((format!("xml:{}", attribute.name.local), attribute.value.as_str()));
            continue;
        }
        // Namespaced attributes always need a prefix; the default namespace
        // never applies to them.
        let prefix = match &attribute.prefix {
            Some(p) if lookup(scope, Some(p)).is_none_or(|bound| bound == namespace) => p.clone(),
            _ => format!("ns{index}"),
        };
        if lookup(scope, Some(&prefix)) != Some(namespace) {
            let binding = (Some(prefix.clone()), Some(namespace.to_string()));
            declarations.push(declaration(&binding));
            scope.push(binding);
        }
        attributes.push((qualify(Some(&prefix), &attribute.name.local), attribute.value.as_str()));
    }

    let mut start = BytesStart::new(qualified.as_str());
    for (key, value) in &declarations {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    for (key, value) in &attributes {
        start.push_attribute((key.as_str(), *value));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).or_raise(|| ErrorKind::Serialize)?;
    } else {
        writer.write_event(Event::Start(start)).or_raise(|| ErrorKind::Serialize)?;
        for child in &element.children {
            match child {
                Node::Element(e) => write_element(writer, e, scope)?,
                Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t))).or_raise(|| ErrorKind::Serialize)?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(qualified.as_str()))).or_raise(|| ErrorKind::Serialize)?;
    }

    scope.truncate(mark);
    Ok(())
}

/// Namespace currently bound to `prefix`, innermost binding first.
fn lookup<'a>(scope: &'a [Binding], prefix: Option<&str>) -> Option<&'a str> {
    scope.iter().rev().find(|(p, _)| p.as_deref() == prefix).and_then(|(_, uri)| uri.as_deref())
}

fn declaration((prefix, uri): &Binding) -> (String, String) {
    let key = match prefix {
        Some(p) => format!("xmlns:{p}"),
        None => "xmlns".to_string(),
    };
    (key, uri.clone().unwrap_or_default())
}

fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::xml::{Document, Element, QName};

    fn written(doc: &Document) -> String {
        doc.to_xml_string().unwrap()
    }

    #[test]
    fn test_round_trip_keeps_structure() {
        let source = r#"<p:a xmlns:p="urn:p"><p:b k="1">x &amp; y</p:b><c/></p:a>"#;
        let doc: Document = source.parse().unwrap();
        let reparsed: Document = written(&doc).parse().unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn test_fragment_declares_inherited_namespace() {
        // The child only has a namespace through its parent's declaration.
        let doc: Document = r#"<p:a xmlns:p="urn:p"><p:b>1</p:b></p:a>"#.parse().unwrap();
        let fragment = Document::new(doc.root().elements().next().unwrap().clone());
        let xml = written(&fragment);
        assert!(xml.contains(r#"<p:b xmlns:p="urn:p">1</p:b>"#), "{xml}");
    }

    #[test]
    fn test_keeps_declarations_only_used_in_attribute_values() {
        let doc: Document = r#"<pb:b xmlns:pb="urn:pb" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xs="http://www.w3.org/2001/XMLSchema"><pb:v xsi:type="xs:string">1</pb:v></pb:b>"#
            .parse()
            .unwrap();
        let xml = written(&doc);
        assert!(xml.contains(r#"xmlns:xs="http://www.w3.org/2001/XMLSchema""#), "{xml}");
        // Declared once, on the element that declared it in the source.
        assert_eq!(xml.matches("xmlns:xsi=").count(), 1, "{xml}");
        assert_eq!(written(&written(&doc).parse().unwrap()), xml);
    }

    #[test]
    fn test_fragment_keeps_declarations_made_inside_it() {
        let doc: Document =
            r#"<a xmlns:p="urn:p"><p:b xmlns:xs="urn:xs" p:type="xs:string"/></a>"#.parse().unwrap();
        let fragment = Document::new(doc.root().elements().next().unwrap().clone());
        let xml = written(&fragment);
        assert!(xml.contains(r#"xmlns:xs="urn:xs""#), "{xml}");
        assert!(xml.contains(r#"xmlns:p="urn:p""#), "{xml}");
    }

    #[test]
    fn test_element_name_wins_over_conflicting_declaration() {
        let root = Element::new(QName::namespaced("urn:a", "a"))
            .with_prefix("p")
            .with_declaration(Some("p"), "urn:other")
            .with_declaration(Some("q"), "urn:q");
        let xml = written(&Document::new(root));
        assert!(xml.contains(r#"<p:a xmlns:q="urn:q" xmlns:p="urn:a"/>"#), "{xml}");
    }

    #[test]
    fn test_undeclares_default_namespace_for_unqualified_child() {
        let root = Element::new(QName::namespaced("urn:d", "a")).with_child(Element::new(QName::local("b")));
        let xml = written(&Document::new(root));
        assert!(xml.contains(r#"<a xmlns="urn:d"><b xmlns=""/></a>"#), "{xml}");
    }

    #[test]
    fn test_generates_prefix_for_unprefixed_namespaced_attribute() {
        let root = Element::new(QName::local("a")).with_attribute(QName::namespaced("urn:x", "k"), "v");
        let reparsed: Document = written(&Document::new(root.clone())).parse().unwrap();
        assert_eq!(reparsed.root().attribute(&QName::namespaced("urn:x", "k")), Some("v"));
    }
}
