//! Structural XML Comparison
//!
//! Two trees are equivalent when they carry the same values in the same
//! structure. Node identity, namespace prefixes, attribute order and
//! whitespace-only text are all irrelevant; text is compared trimmed.

use crate::xml::{Document, Element, Node, QName};
use derive_more::Display;
use std::fmt;

/// A single way in which two trees differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Location of the differing node in the expected tree, e.g.
    /// `/PBCoreDescriptionDocument[1]/pbcoreTitle[2]`.
    pub location: String,
    pub kind: DifferenceKind,
}
impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DifferenceKind {
    #[display("element name differs: expected {expected}, found {actual}")]
    ElementName { expected: QName, actual: QName },
    #[display("attribute {name} differs: expected '{expected}', found '{actual}'")]
    AttributeValue { name: QName, expected: String, actual: String },
    #[display("attribute {_0} is missing")]
    MissingAttribute(QName),
    #[display("unexpected attribute {_0}")]
    UnexpectedAttribute(QName),
    #[display("number of child nodes differs: expected {expected}, found {actual}")]
    ChildCount { expected: usize, actual: usize },
    #[display("node type differs: expected {expected}, found {actual}")]
    NodeType { expected: &'static str, actual: &'static str },
    #[display("text differs: expected '{expected}', found '{actual}'")]
    Text { expected: String, actual: String },
}

/// Every structural difference between `expected` and `actual`.
pub fn diff(expected: &Element, actual: &Element) -> Vec<Difference> {
    let mut differences = Vec::new();
    compare_elements(expected, actual, &format!("/{}[1]", expected.name.local), &mut differences);
    differences
}

impl Document {
    /// See [`diff`].
    pub fn diff(&self, actual: &Document) -> Vec<Difference> {
        diff(self.root(), actual.root())
    }

    /// `true` when [`diff`](Self::diff) finds nothing.
    pub fn is_equivalent(&self, other: &Document) -> bool {
        self.diff(other).is_empty()
    }
}

/// Children that take part in comparison.
enum Significant<'a> {
    Element(&'a Element),
    Text(&'a str),
}
impl Significant<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Element(_) => "element",
            Self::Text(_) => "text",
        }
    }
}

fn significant(element: &Element) -> Vec<Significant<'_>> {
    element
        .children
        .iter()
        .filter_map(|child| match child {
            Node::Element(e) => Some(Significant::Element(e)),
            Node::Text(t) => Some(t.trim()).filter(|t| !t.is_empty()).map(Significant::Text),
        })
        .collect()
}

fn compare_elements(expected: &Element, actual: &Element, location: &str, differences: &mut Vec<Difference>) {
    let push = |differences: &mut Vec<Difference>, kind| {
        differences.push(Difference {
            location: location.to_string(),
            kind,
        })
    };

    if expected.name != actual.name {
        // Nothing below a renamed element can be meaningfully paired up.
        push(differences, DifferenceKind::ElementName {
            expected: expected.name.clone(),
            actual: actual.name.clone(),
        });
        return;
    }

    for attribute in &expected.attributes {
        match actual.attribute(&attribute.name) {
            None => push(differences, DifferenceKind::MissingAttribute(attribute.name.clone())),
            Some(value) if value != attribute.value => push(differences, DifferenceKind::AttributeValue {
                name: attribute.name.clone(),
                expected: attribute.value.clone(),
                actual: value.to_string(),
            }),
            Some(_) => {},
        }
    }
    for attribute in &actual.attributes {
        if expected.attribute(&attribute.name).is_none() {
            push(differences, DifferenceKind::UnexpectedAttribute(attribute.name.clone()));
        }
    }

    let expected_children = significant(expected);
    let actual_children = significant(actual);
    if expected_children.len() != actual_children.len() {
        push(differences, DifferenceKind::ChildCount {
            expected: expected_children.len(),
            actual: actual_children.len(),
        });
    }

    let mut seen: Vec<(&QName, usize)> = Vec::new();
    for (e, a) in expected_children.iter().zip(&actual_children) {
        match (e, a) {
            (Significant::Text(e), Significant::Text(a)) => {
                if e != a {
                    push(differences, DifferenceKind::Text {
                        expected: e.to_string(),
                        actual: a.to_string(),
                    });
                }
            },
            (Significant::Element(e), Significant::Element(a)) => {
                let position = match seen.iter_mut().find(|(name, _)| *name == &e.name) {
                    Some((_, count)) => {
                        *count += 1;
                        *count
                    },
                    None => {
                        seen.push((&e.name, 1));
                        1
                    },
                };
                let child_location = format!("{location}/{}[{position}]", e.name.local);
                compare_elements(e, a, &child_location, differences);
            },
            (e, a) => push(differences, DifferenceKind::NodeType {
                expected: e.kind(),
                actual: a.kind(),
            }),
        }
    }
}
