use super::{Attribute, Declaration, Element, Node, QName};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, PrefixDeclaration, ResolveResult};
use quick_xml::reader::NsReader;

/// Builds an [`Element`] tree from raw XML bytes.
///
/// Comments, processing instructions and the doctype are dropped. Adjacent
/// text and CDATA sections are merged into a single [`Node::Text`].
pub(super) fn parse(xml: &[u8]) -> Result<Element> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();
    // Currently open elements, innermost last.
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => {
                let position = reader.error_position();
                return Err(e).or_raise(|| ErrorKind::MalformedXml(format!("syntax error at byte {position}")));
            },
        };
        match event {
            Event::Start(start) => {
                let element = element(&reader, &start)?;
                open.push(element);
            },
            Event::Empty(start) => {
                let element = element(&reader, &start)?;
                close(element, &mut open, &mut root)?;
            },
            Event::End(_) => {
                // quick-xml already verifies end tag names against start tags.
                let element =
                    open.pop().ok_or_raise(|| ErrorKind::MalformedXml("unexpected closing tag".to_string()))?;
                close(element, &mut open, &mut root)?;
            },
            Event::Text(text) => {
                let text = text.unescape().or_raise(|| ErrorKind::MalformedXml("invalid text content".to_string()))?;
                push_text(&mut open, &text);
            },
            Event::CData(cdata) => {
                let bytes = cdata.into_inner();
                push_text(&mut open, utf8(&bytes)?);
            },
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {},
        }
        buf.clear();
    }

    if !open.is_empty() {
        exn::bail!(ErrorKind::MalformedXml("unclosed element at end of input".to_string()));
    }
    root.ok_or_raise(|| ErrorKind::MalformedXml("document has no root element".to_string()))
}

/// Attaches a finished element to its parent, or makes it the root.
fn close(element: Element, open: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        exn::bail!(ErrorKind::MalformedXml("more than one root element".to_string()));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(open: &mut [Element], text: &str) {
    // Text outside the root element can only be whitespace in well-formed XML.
    let Some(parent) = open.last_mut() else {
        return;
    };
    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
}

fn element(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let (resolved, local) = reader.resolve_element(start.name());
    let name = QName {
        namespace: namespace(resolved)?,
        local: utf8(local.as_ref())?.to_string(),
    };
    let prefix = start.name().prefix().map(|p| utf8(p.as_ref()).map(str::to_string)).transpose()?;

    let mut declarations = Vec::new();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.or_raise(|| ErrorKind::MalformedXml(format!("invalid attribute on <{}>", name.local)))?;
        // Declarations are kept apart from attributes so they never take
        // part in comparison.
        if let Some(binding) = attribute.key.as_namespace_binding() {
            let declared = match binding {
                PrefixDeclaration::Default => None,
                PrefixDeclaration::Named(p) => Some(utf8(p)?.to_string()),
            };
            let uri = attribute
                .unescape_value()
                .or_raise(|| ErrorKind::MalformedXml(format!("invalid namespace declaration on <{}>", name.local)))?;
            declarations.push(Declaration {
                prefix: declared,
                uri: uri.into_owned(),
            });
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attribute.key);
        let value = attribute
            .unescape_value()
            .or_raise(|| ErrorKind::MalformedXml(format!("invalid attribute value on <{}>", name.local)))?;
        attributes.push(Attribute {
            name: QName {
                namespace: namespace(resolved)?,
                local: utf8(local.as_ref())?.to_string(),
            },
            prefix: attribute.key.prefix().map(|p| utf8(p.as_ref()).map(str::to_string)).transpose()?,
            value: value.into_owned(),
        });
    }

    Ok(Element {
        name,
        prefix,
        declarations,
        attributes,
        children: Vec::new(),
    })
}

fn namespace(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) if uri.is_empty() => Ok(None),
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(utf8(uri)?.to_string())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => exn::bail!(ErrorKind::MalformedXml(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).or_raise(|| ErrorKind::MalformedXml("invalid UTF-8".to_string()))
}
