//! Has-file relations between a program object and its file objects.

use crate::comment::Change;
use crate::creator::Session;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use radiotv_repository::error::Result as RepositoryResult;
use radiotv_repository::{Pid, Relation, RepositoryClient};
use std::collections::BTreeSet;

/// File objects a reconciliation linked to or unlinked from the program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationChanges {
    pub added: Vec<Pid>,
    pub removed: Vec<Pid>,
}
impl RelationChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Objects `pid` currently points at with `predicate`. Literal relations are
/// ignored.
pub(crate) async fn related(client: &dyn RepositoryClient, pid: &Pid, predicate: &str) -> RepositoryResult<BTreeSet<Pid>> {
    let relations = client.object_relations(pid, predicate).await?;
    Ok(relations.iter().filter_map(Relation::object_pid).cloned().collect())
}

/// Makes the has-file relations of `pid` exactly `files`: stale relations
/// are removed first, then missing ones added.
pub(crate) async fn reconcile(session: &Session<'_>, pid: &Pid, files: &[Pid]) -> Result<RelationChanges> {
    let predicate = session.context.has_file_relation.as_str();
    let existing = session.client.object_relations(pid, predicate).await.or_raise(|| ErrorKind::Repository)?;

    let mut changes = RelationChanges::default();
    let mut linked = BTreeSet::new();
    for relation in &existing {
        let Some(object) = relation.object_pid() else {
            continue;
        };
        if files.contains(object) {
            linked.insert(object.clone());
            continue;
        }
        tracing::debug!(%pid, file = %object, "Removing stale file relation");
        let comment = session.comment(Change::RelationRemoved { predicate, object })?;
        session.client.remove_object_relation(relation, &comment).await.or_raise(|| ErrorKind::Repository)?;
        changes.removed.push(object.clone());
    }

    for file in files {
        // Also collapses duplicate file URLs in the record.
        if !linked.insert(file.clone()) {
            continue;
        }
        tracing::debug!(%pid, %file, "Adding file relation");
        let comment = session.comment(Change::RelationAdded { predicate, object: file })?;
        let relation = Relation::between(pid.clone(), predicate, file.clone());
        session.client.add_object_relation(&relation, &comment).await.or_raise(|| ErrorKind::Repository)?;
        changes.added.push(file.clone());
    }
    Ok(changes)
}
