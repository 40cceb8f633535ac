//! Audit comments attached to every mutating repository call.
//!
//! Comments are rendered from an [upon] template with two variables:
//!
//! | Variable   | Description                                    |
//! |------------|------------------------------------------------|
//! | `filename` | Name of the program record being ingested      |
//! | `message`  | What the call changes, e.g. `updated datastream` |

use crate::error::{Error, ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use radiotv_repository::Pid;
use std::fmt;
use std::str::FromStr;
use upon::{Engine, Template};

/// A single change made to a program object, as described in its audit trail.
#[derive(Debug, Display, Clone, Copy)]
pub(crate) enum Change<'a> {
    #[display("creating Program Object")]
    Created,
    #[display("unpublished object to allow for changes")]
    Unpublished,
    #[display("added old identifiers [{}]", _0.join(", "))]
    OldIdentifiers(&'a [String]),
    #[display("added program title '{_0}' object label")]
    Label(&'a str),
    #[display("updated datastream")]
    Datastream,
    #[display("removed relation '{predicate}' to '{object}'")]
    RelationRemoved { predicate: &'a str, object: &'a Pid },
    #[display("added relation '{predicate}' to '{object}'")]
    RelationAdded { predicate: &'a str, object: &'a Pid },
}

/// Renders audit comments from a compiled template.
///
/// Constructed via [`FromStr`], so syntax errors surface at creation time
/// rather than halfway through an ingest.
pub struct Commenter {
    engine: Engine<'static>,
    template: Template<'static>,
    source: String,
}
impl FromStr for Commenter {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let engine = Engine::new();
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self {
            engine,
            template,
            source: s.to_string(),
        })
    }
}
impl Commenter {
    /// Renders the comment for a change made while ingesting `filename`.
    pub fn render(&self, filename: &str, message: impl fmt::Display) -> Result<String> {
        self.template
            .render(&self.engine, upon::value! { filename: filename, message: message.to_string() })
            .to_string()
            .or_raise(|| ErrorKind::Template)
    }
}
impl fmt::Debug for Commenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commenter").field("template", &self.source).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiotv_config::DEFAULT_COMMENT_TEMPLATE;
    use rstest::rstest;

    #[rstest]
    #[case::created(Change::Created, "creating Program Object")]
    #[case::unpublished(Change::Unpublished, "unpublished object to allow for changes")]
    #[case::label(Change::Label("TV Avisen"), "added program title 'TV Avisen' object label")]
    #[case::datastream(Change::Datastream, "updated datastream")]
    fn test_messages(#[case] change: Change<'_>, #[case] expected: &str) {
        assert_eq!(change.to_string(), expected);
    }

    #[test]
    fn test_list_and_relation_messages() {
        let ids = ["4711".to_string(), "tv-0815".to_string()];
        assert_eq!(Change::OldIdentifiers(&ids).to_string(), "added old identifiers [4711, tv-0815]");
        let file = Pid::from("uuid:file");
        let removed = Change::RelationRemoved {
            predicate: "urn:hasFile",
            object: &file,
        };
        assert_eq!(removed.to_string(), "removed relation 'urn:hasFile' to 'uuid:file'");
    }

    #[test]
    fn test_default_template() {
        let commenter: Commenter = DEFAULT_COMMENT_TEMPLATE.parse().unwrap();
        let comment = commenter.render("2010-01-01_dr1.xml", Change::Datastream).unwrap();
        assert_eq!(comment, "RadioTV ingest of '2010-01-01_dr1.xml': updated datastream");
    }

    #[test]
    fn test_invalid_template() {
        let err = "{{ filename".parse::<Commenter>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[test]
    fn test_unknown_variable_fails_to_render() {
        let commenter: Commenter = "{{ nope }}".parse().unwrap();
        let err = commenter.render("file.xml", Change::Created).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }
}
