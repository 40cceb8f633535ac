use derive_more::Display;
use std::borrow::Borrow;

/// Identifier of the Dublin Core datastream every object carries.
pub const DC_DATASTREAM: &str = "DC";

/// Persistent identifier of a repository object, e.g. `uuid:0a1b...`.
///
/// Opaque: no structure is assumed beyond it being a non-empty string.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(String);
impl Pid {
    pub fn new(pid: impl Into<String>) -> Self {
        Self(pid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
impl From<String> for Pid {
    fn from(pid: String) -> Self {
        Self(pid)
    }
}
impl From<&str> for Pid {
    fn from(pid: &str) -> Self {
        Self(pid.to_string())
    }
}
impl AsRef<str> for Pid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Borrow<str> for Pid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Target of a relation.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum RelationObject {
    /// Another object in the repository.
    Object(Pid),
    /// A plain value.
    #[display("\"{_0}\"")]
    Literal(String),
}

/// A single `subject -predicate-> object` relation stored on `subject`.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
#[display("{subject} <{predicate}> {object}")]
pub struct Relation {
    pub subject: Pid,
    pub predicate: String,
    pub object: RelationObject,
}
impl Relation {
    /// A relation between two objects.
    pub fn between(subject: Pid, predicate: impl Into<String>, object: Pid) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: RelationObject::Object(object),
        }
    }

    /// The object's PID, unless this relation points at a literal.
    pub fn object_pid(&self) -> Option<&Pid> {
        match &self.object {
            RelationObject::Object(pid) => Some(pid),
            RelationObject::Literal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_display() {
        let relation = Relation::between(Pid::from("uuid:p"), "urn:hasFile", Pid::from("uuid:f"));
        assert_eq!(relation.to_string(), "uuid:p <urn:hasFile> uuid:f");
        assert_eq!(relation.object_pid(), Some(&Pid::from("uuid:f")));
    }

    #[test]
    fn test_literal_has_no_pid() {
        let relation = Relation {
            subject: Pid::from("uuid:p"),
            predicate: "urn:title".to_string(),
            object: RelationObject::Literal("News".to_string()),
        };
        assert_eq!(relation.object_pid(), None);
        assert_eq!(relation.to_string(), "uuid:p <urn:title> \"News\"");
    }
}
