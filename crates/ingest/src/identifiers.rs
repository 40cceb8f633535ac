//! Old identifiers: finding an existing program object by them, and
//! recording them on it.

use crate::comment::Change;
use crate::creator::Session;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use radiotv_extract::dc;
use radiotv_repository::error::ErrorKind as RepositoryErrorKind;
use radiotv_repository::{DC_DATASTREAM, Pid, RepositoryClient};

/// The program object listing any of `old_identifiers`, trying each in turn.
///
/// When one identifier matches several objects the first is used and a
/// warning logged.
pub(crate) async fn find_existing(client: &dyn RepositoryClient, old_identifiers: &[String]) -> Result<Option<Pid>> {
    for identifier in old_identifiers {
        let pids = match client.pids_for_old_identifier(identifier).await {
            Ok(pids) => pids,
            Err(e) if matches!(&*e, RepositoryErrorKind::NotFound(_)) => continue,
            Err(e) => return Err(e).or_raise(|| ErrorKind::ObjectLookup),
        };
        let Some(first) = pids.first().filter(|pid| !pid.as_str().is_empty()) else {
            continue;
        };
        if pids.len() > 1 {
            tracing::warn!(
                old_identifier = %identifier,
                pids = ?pids,
                pid = %first,
                "Found more than one object for old identifier, using the first"
            );
        }
        return Ok(Some(first.clone()));
    }
    Ok(None)
}

/// Adds whichever of `old_identifiers` the object's `DC` datastream is
/// missing. Returns the identifiers added; nothing is written when that's
/// empty.
pub(crate) async fn merge_into_dc(session: &Session<'_>, pid: &Pid, old_identifiers: &[String]) -> Result<Vec<String>> {
    let mut document = session.client.datastream(pid, DC_DATASTREAM).await.or_raise(|| ErrorKind::Repository)?;
    let added = dc::add_identifiers(&mut document, old_identifiers);
    if added.is_empty() {
        tracing::debug!(%pid, "Object already lists every old identifier");
        return Ok(added);
    }
    tracing::debug!(%pid, added = ?added, "Adding old identifiers to DC datastream");
    let comment = session.comment(Change::OldIdentifiers(&added))?;
    session
        .client
        .update_datastream(pid, DC_DATASTREAM, &document, &comment)
        .await
        .or_raise(|| ErrorKind::Repository)?;
    Ok(added)
}
