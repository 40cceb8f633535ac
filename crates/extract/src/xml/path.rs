//! A deliberately small subset of XPath 1.0.
//!
//! Supported syntax:
//! - absolute (`/a/b`), descendant (`//a`, `a//b`) and relative (`a/b`) location paths,
//! - name tests `local`, `prefix:local` and `*`,
//! - predicates testing a child element, optionally against a string value:
//!   `a[p:child]`, `a[p:child="value"]`,
//! - top-level unions `//a | //b`, yielding matches in document order.
//!
//! Prefixes are resolved against a [`Namespaces`] map when the expression is
//! parsed, so evaluation only ever compares namespace URIs.

use super::{Element, QName};
use crate::error::{ErrorKind, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::ptr;

/// Prefix to namespace URI bindings used when parsing expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces(BTreeMap<String, String>);
impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.0.insert(prefix.into(), uri.into());
        self
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }
}
impl<P: Into<String>, U: Into<String>> FromIterator<(P, U)> for Namespaces {
    fn from_iter<T: IntoIterator<Item = (P, U)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(p, u)| (p.into(), u.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(QName),
}
impl NameTest {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Any => true,
            Self::Name(name) => &element.name == name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    child: NameTest,
    value: Option<String>,
}
impl Predicate {
    fn matches(&self, element: &Element) -> bool {
        element
            .elements()
            .any(|child| self.child.matches(child) && self.value.as_ref().is_none_or(|v| &child.text() == v))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicates: Vec<Predicate>,
}
impl Step {
    fn matches(&self, element: &Element) -> bool {
        self.test.matches(element) && self.predicates.iter().all(|p| p.matches(element))
    }

    /// Elements reached from `context` by this step, in document order.
    fn apply<'a>(&self, context: &'a Element) -> Vec<&'a Element> {
        let candidates = match self.axis {
            Axis::Child => context.elements().collect(),
            Axis::Descendant => {
                let mut all = Vec::new();
                for child in context.elements() {
                    preorder(child, &mut all);
                }
                all
            },
        };
        candidates.into_iter().filter(|e| self.matches(e)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Branch {
    absolute: bool,
    steps: Vec<Step>,
}

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    expression: String,
    branches: Vec<Branch>,
}
impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
impl XPath {
    /// Compiles `expression`, resolving every prefix through `namespaces`.
    pub fn parse(expression: &str, namespaces: &Namespaces) -> Result<Self> {
        let invalid = |reason: &'static str| ErrorKind::InvalidPath {
            expression: expression.to_string(),
            reason,
        };
        let mut branches = Vec::new();
        for branch in split_top_level(expression, '|') {
            branches.push(parse_branch(branch.trim(), namespaces).map_err(|reason| exn::Exn::from(invalid(reason)))?);
        }
        Ok(Self {
            expression: expression.to_string(),
            branches,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// `from_document` evaluates as if `context` were wrapped in a document
    /// node, which is what makes `/root` and `//root` able to match it.
    pub(super) fn evaluate<'a>(&self, context: &'a Element, from_document: bool) -> Vec<&'a Element> {
        let mut found: Vec<&'a Element> = Vec::new();
        for branch in &self.branches {
            for element in evaluate_branch(branch, context, from_document) {
                if !found.iter().any(|f| ptr::eq(*f, element)) {
                    found.push(element);
                }
            }
        }
        if self.branches.len() > 1 {
            let mut order = Vec::new();
            preorder(context, &mut order);
            found.sort_by_key(|element| order.iter().position(|o| ptr::eq(*o, *element)));
        }
        found
    }
}

fn evaluate_branch<'a>(branch: &Branch, context: &'a Element, from_document: bool) -> Vec<&'a Element> {
    let mut steps = branch.steps.iter();
    let Some(first) = steps.next() else {
        return Vec::new();
    };
    let mut current: Vec<&'a Element> = if branch.absolute || from_document {
        // The virtual document node has exactly one child: the root element.
        let candidates = match first.axis {
            Axis::Child => vec![context],
            Axis::Descendant => {
                let mut all = Vec::new();
                preorder(context, &mut all);
                all
            },
        };
        candidates.into_iter().filter(|e| first.matches(e)).collect()
    } else {
        first.apply(context)
    };
    for step in steps {
        let mut next: Vec<&'a Element> = Vec::new();
        for element in current {
            for found in step.apply(element) {
                if !next.iter().any(|n| ptr::eq(*n, found)) {
                    next.push(found);
                }
            }
        }
        current = next;
    }
    current
}

fn preorder<'a>(element: &'a Element, into: &mut Vec<&'a Element>) {
    into.push(element);
    for child in element.elements() {
        preorder(child, into);
    }
}

fn parse_branch(expression: &str, namespaces: &Namespaces) -> std::result::Result<Branch, &'static str> {
    let (absolute, mut axis, mut rest) = if let Some(rest) = expression.strip_prefix("//") {
        (true, Axis::Descendant, rest)
    } else if let Some(rest) = expression.strip_prefix('/') {
        (true, Axis::Child, rest)
    } else {
        (false, Axis::Child, expression)
    };
    let mut steps = Vec::new();
    loop {
        let end = find_top_level(rest, '/').unwrap_or(rest.len());
        let (step, tail) = rest.split_at(end);
        steps.push(parse_step(step.trim(), axis, namespaces)?);
        if tail.is_empty() {
            break;
        }
        (axis, rest) = match tail.strip_prefix("//") {
            Some(t) => (Axis::Descendant, t),
            None => (Axis::Child, &tail[1..]),
        };
    }
    Ok(Branch { absolute, steps })
}

fn parse_step(step: &str, axis: Axis, namespaces: &Namespaces) -> std::result::Result<Step, &'static str> {
    if step.is_empty() {
        return Err("empty location step");
    }
    let (name, mut rest) = match step.find('[') {
        Some(index) => step.split_at(index),
        None => (step, ""),
    };
    let test = parse_name(name.trim(), namespaces)?;
    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let body = rest.strip_prefix('[').ok_or("unexpected characters after predicate")?;
        let end = find_top_level(body, ']').ok_or("unterminated predicate")?;
        predicates.push(parse_predicate(body[..end].trim(), namespaces)?);
        rest = body[end + 1..].trim_start();
    }
    Ok(Step { axis, test, predicates })
}

fn parse_predicate(predicate: &str, namespaces: &Namespaces) -> std::result::Result<Predicate, &'static str> {
    let Some(index) = find_top_level(predicate, '=') else {
        return Ok(Predicate {
            child: parse_name(predicate, namespaces)?,
            value: None,
        });
    };
    let (name, value) = (predicate[..index].trim(), predicate[index + 1..].trim());
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .ok_or("predicate value must be a quoted string")?;
    Ok(Predicate {
        child: parse_name(name, namespaces)?,
        value: Some(value.to_string()),
    })
}

fn parse_name(name: &str, namespaces: &Namespaces) -> std::result::Result<NameTest, &'static str> {
    if name == "*" {
        return Ok(NameTest::Any);
    }
    let (namespace, local) = match name.split_once(':') {
        Some((prefix, local)) => (Some(namespaces.uri(prefix).ok_or("unknown namespace prefix")?), local),
        None => (None, name),
    };
    let valid = !local.is_empty()
        && local.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !local.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.');
    if !valid {
        return Err("invalid element name");
    }
    Ok(NameTest::Name(QName {
        namespace: namespace.map(str::to_string),
        local: local.to_string(),
    }))
}

/// Byte offset of the first `target` outside of brackets and quotes.
fn find_top_level(s: &str, target: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (index, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {},
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c == target && depth == 0 => return Some(index),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            _ => {},
        }
    }
    None
}

fn split_top_level(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(index) = find_top_level(rest, separator) {
        parts.push(&rest[..index]);
        rest = &rest[index + separator.len_utf8()..];
    }
    parts.push(rest);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;
    use rstest::rstest;

    const DOC: &str = r#"
        <program xmlns:p="urn:p">
            <items>
                <item>one</item>
                <item>two</item>
            </items>
            <p:meta>
                <p:entry><p:kind>a</p:kind><p:value>first</p:value></p:entry>
                <p:entry><p:kind>b</p:kind><p:value>second</p:value></p:entry>
            </p:meta>
            <p:late/>
            <p:early/>
        </program>
    "#;

    fn namespaces() -> Namespaces {
        Namespaces::new().with("p", "urn:p")
    }

    fn texts(doc: &Document, expression: &str) -> Vec<String> {
        let path = XPath::parse(expression, &namespaces()).unwrap();
        doc.select(&path).into_iter().map(Element::text).collect()
    }

    #[rstest]
    #[case("//program/items/item", &["one", "two"])]
    #[case("/program/items/item", &["one", "two"])]
    #[case("//item", &["one", "two"])]
    #[case("program//item", &["one", "two"])]
    #[case("/items/item", &[])]
    #[case("//p:entry[p:kind=\"b\"]/p:value", &["second"])]
    #[case("//p:entry[p:kind='a']/p:value", &["first"])]
    #[case("//p:entry[p:kind]/p:value", &["first", "second"])]
    #[case("//p:meta/*/p:kind", &["a", "b"])]
    #[case("//item[p:kind]", &[])]
    fn test_select(#[case] expression: &str, #[case] expected: &[&str]) {
        let doc: Document = DOC.parse().unwrap();
        assert_eq!(texts(&doc, expression), expected);
    }

    #[test]
    fn test_union_is_in_document_order() {
        let doc: Document = DOC.parse().unwrap();
        let path = XPath::parse("//program/p:early | //program/p:late", &namespaces()).unwrap();
        let found = doc.select(&path);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name.local, "late");
        assert_eq!(found[1].name.local, "early");
    }

    #[test]
    fn test_relative_from_element() {
        let doc: Document = DOC.parse().unwrap();
        let meta = doc.select_first(&XPath::parse("//p:meta", &namespaces()).unwrap()).unwrap();
        let path = XPath::parse("p:entry[p:kind=\"a\"]/p:value", &namespaces()).unwrap();
        assert_eq!(meta.select_first(&path).map(Element::text).as_deref(), Some("first"));
        // A relative path never matches the context element itself.
        assert!(meta.select(&XPath::parse("p:meta", &namespaces()).unwrap()).is_empty());
    }

    #[rstest]
    #[case("")]
    #[case("//")]
    #[case("//x:item")]
    #[case("//item[")]
    #[case("//item[kind=unquoted]")]
    #[case("//item]")]
    #[case("//1item")]
    fn test_rejects_invalid(#[case] expression: &str) {
        let err = XPath::parse(expression, &namespaces()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath { .. }));
    }
}
