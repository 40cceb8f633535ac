//! Whether an existing program object already holds what a record describes.

use crate::relations;
use derive_more::Display;
use radiotv_extract::models::{Fragment, Program};
use radiotv_repository::error::Result as RepositoryResult;
use radiotv_repository::{Pid, RepositoryClient};
use std::collections::BTreeSet;

/// Something compared by the identity check.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Object label versus record title.
    Title,
    #[display("PBCore")]
    Pbcore,
    Ritzau,
    Gallup,
    Broadcast,
    /// Has-file relations versus file URLs.
    Relations,
}
impl From<Fragment> for Field {
    fn from(fragment: Fragment) -> Self {
        match fragment {
            Fragment::Pbcore => Self::Pbcore,
            Fragment::Ritzau => Self::Ritzau,
            Fragment::Gallup => Self::Gallup,
            Fragment::Broadcast => Self::Broadcast,
        }
    }
}

/// Result of comparing an existing object against a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Equivalence {
    /// Nothing would change; no writes were made.
    Identical,
    /// These fields differ, in comparison order.
    Differs(Vec<Field>),
    /// The comparison itself failed, so the object is treated as differing.
    Unverifiable,
}
impl Equivalence {
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }
}

/// Compares title, all four fragments and the file relations of `pid` against
/// `program`. Never fails: a repository error makes the result
/// [`Unverifiable`](Equivalence::Unverifiable).
pub(crate) async fn check(
    client: &dyn RepositoryClient,
    pid: &Pid,
    program: &Program,
    files: &[Pid],
    predicate: &str,
) -> Equivalence {
    match differing_fields(client, pid, program, files, predicate).await {
        Ok(fields) if fields.is_empty() => Equivalence::Identical,
        Ok(fields) => {
            tracing::debug!(%pid, ?fields, "Object differs from record");
            Equivalence::Differs(fields)
        },
        Err(e) => {
            tracing::warn!(%pid, error = ?e, "Could not compare object with record, regarding it as not identical");
            Equivalence::Unverifiable
        },
    }
}

async fn differing_fields(
    client: &dyn RepositoryClient,
    pid: &Pid,
    program: &Program,
    files: &[Pid],
    predicate: &str,
) -> RepositoryResult<Vec<Field>> {
    let mut fields = Vec::new();

    let title = client.object_title(pid).await?;
    if title != program.title {
        tracing::debug!(expected = %program.title, actual = %title, "Titles not identical");
        fields.push(Field::Title);
    }

    for (fragment, expected) in program.fragments.iter() {
        let actual = client.datastream(pid, fragment.datastream_id()).await?;
        let differences = expected.diff(&actual);
        if let Some(first) = differences.first() {
            tracing::debug!(%fragment, count = differences.len(), first = %first, "Datastream not identical");
            fields.push(fragment.into());
        }
    }

    let expected: BTreeSet<&Pid> = files.iter().collect();
    let actual = relations::related(client, pid, predicate).await?;
    if expected != actual.iter().collect::<BTreeSet<_>>() {
        tracing::debug!(?expected, ?actual, "File relations not identical");
        fields.push(Field::Relations);
    }

    Ok(fields)
}
