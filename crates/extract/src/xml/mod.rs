//! Owned, namespace-aware XML tree.
//!
//! Program records and datastreams are small, so the whole document is held
//! in memory as a plain tree of [`Element`]s and [`Node`]s. Names are always
//! compared by namespace URI and local name; the prefix an element was written
//! with is only remembered so that serializing the tree looks familiar.

mod parse;
mod path;
mod write;

pub use self::path::{Namespaces, XPath};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Expanded element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}
impl QName {
    /// A name that lives in the given namespace.
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// A name without a namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }
}
impl fmt::Display for QName {
    /// Clark notation, `{namespace}local`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{{{namespace}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub prefix: Option<String>,
    pub value: String,
}

/// A namespace declaration written on an element, `xmlns:prefix="uri"`
/// (or `xmlns="uri"` when `prefix` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data; CDATA sections are folded into text.
    Text(String),
}
impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}
impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub prefix: Option<String>,
    /// Declarations made on this element in the source. Writing the tree
    /// repeats them, so prefixes only referenced from attribute values (such
    /// as `xsi:type="xs:string"`) keep their meaning.
    pub declarations: Vec<Declaration>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}
impl Element {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            prefix: None,
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_declaration(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.declarations.push(Declaration {
            prefix: prefix.map(str::to_string),
            uri: uri.into(),
        });
        self
    }

    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name,
            prefix: None,
            value: value.into(),
        });
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Value of the attribute with the given name, if present.
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes.iter().find(|a| &a.name == name).map(|a| a.value.as_str())
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, into: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => into.push_str(t),
                Node::Element(e) => e.collect_text(into),
            }
        }
    }

    /// Evaluates `path` with this element as the context node. Absolute
    /// expressions treat this element as the root of its own document.
    pub fn select<'a>(&'a self, path: &XPath) -> Vec<&'a Element> {
        path.evaluate(self, false)
    }

    /// First match of `path` in document order.
    pub fn select_first<'a>(&'a self, path: &XPath) -> Option<&'a Element> {
        self.select(path).into_iter().next()
    }

    /// Inserts `nodes` immediately before the first element (in document
    /// order, excluding `self`) named `name`.
    ///
    /// Hands the nodes back untouched when no such element exists, so the
    /// caller can decide where they should go instead.
    pub fn insert_before_first(&mut self, name: &QName, nodes: Vec<Node>) -> std::result::Result<(), Vec<Node>> {
        let mut nodes = nodes;
        for index in 0..self.children.len() {
            let Node::Element(child) = &mut self.children[index] else {
                continue;
            };
            if &child.name == name {
                self.children.splice(index..index, nodes);
                return Ok(());
            }
            match child.insert_before_first(name, nodes) {
                Ok(()) => return Ok(()),
                Err(returned) => nodes = returned,
            }
        }
        Err(nodes)
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}
impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parses raw bytes (UTF-8) into a document.
    #[instrument(skip(xml), fields(xml_size = xml.as_ref().len()))]
    pub fn parse(xml: impl AsRef<[u8]>) -> Result<Self> {
        parse::parse(xml.as_ref()).map(Self::new)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Evaluates `path` against the document node.
    pub fn select<'a>(&'a self, path: &XPath) -> Vec<&'a Element> {
        path.evaluate(&self.root, true)
    }

    /// First match of `path` in document order.
    pub fn select_first<'a>(&'a self, path: &XPath) -> Option<&'a Element> {
        self.select(path).into_iter().next()
    }

    /// Serializes the document, including an XML declaration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        write::write(&self.root)
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        // Infallible: the writer only ever receives `&str` input.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
impl From<Element> for Document {
    fn from(root: Element) -> Self {
        Self::new(root)
    }
}
impl FromStr for Document {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:example";

    #[test]
    fn test_text_concatenates_descendants() {
        let doc: Document = r#"<a>one<b>two<c>three</c></b>four</a>"#.parse().unwrap();
        assert_eq!(doc.root().text(), "onetwothreefour");
    }

    #[test]
    fn test_insert_before_first_nested() {
        let mut doc: Document = format!(r#"<x:root xmlns:x="{NS}"><x:meta><x:id>1</x:id><x:id>2</x:id></x:meta></x:root>"#)
            .parse()
            .unwrap();
        let name = QName::namespaced(NS, "id");
        let new = Element::new(name.clone()).with_child("0");
        doc.root_mut().insert_before_first(&name, vec![new.into()]).unwrap();
        let ids: Vec<_> = doc.root().elements().next().unwrap().elements().map(Element::text).collect();
        assert_eq!(ids, ["0", "1", "2"]);
    }

    #[test]
    fn test_insert_before_first_returns_nodes_when_absent() {
        let mut doc: Document = "<root><other/></root>".parse().unwrap();
        let nodes = vec![Node::from("text")];
        let returned = doc.root_mut().insert_before_first(&QName::local("missing"), nodes.clone()).unwrap_err();
        assert_eq!(returned, nodes);
    }

    #[test]
    fn test_qname_display() {
        assert_eq!(QName::namespaced(NS, "id").to_string(), "{urn:example}id");
        assert_eq!(QName::local("id").to_string(), "id");
    }
}
