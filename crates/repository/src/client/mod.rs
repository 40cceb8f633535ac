//! Repository client trait and implementations.
//!
//! This module defines the `RepositoryClient` trait: the narrow
//! create/read/update/list/relation interface the ingester needs from a
//! digital-object repository. The wire protocol, authentication and storage
//! format all live behind it.

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use self::mock::{Method, MockObject, MockRepository, Mutation, ObjectState};
use crate::error::Result;
use crate::models::{Pid, Relation};
use async_trait::async_trait;
use radiotv_extract::xml::Document;
use url::Url;

/// Unified interface for repository clients.
///
/// Every mutating call takes a `comment` that the repository stores in the
/// object's audit trail. Implementations are expected to return
/// [`NotFound`](crate::error::ErrorKind::NotFound) for anything that doesn't
/// exist, so callers can tell a missing object apart from a failed request.
///
/// # Examples
///
/// ```no_run
/// use radiotv_repository::{Pid, RepositoryClient, error::Result};
///
/// async fn label_of_first_match(client: &dyn RepositoryClient, old_id: &str) -> Result<Option<String>> {
///     let Some(pid) = client.pids_for_old_identifier(old_id).await?.into_iter().next() else {
///         return Ok(None);
///     };
///     Ok(Some(client.object_title(&pid).await?))
/// }
/// ```
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Name of the configured client, used for logging only.
    fn name(&self) -> &str;

    /// Objects whose `DC` datastream lists `identifier` as a
    /// `dc:identifier`. An empty list means no object matched; a client may
    /// also report that as [`NotFound`](crate::error::ErrorKind::NotFound).
    async fn pids_for_old_identifier(&self, identifier: &str) -> Result<Vec<Pid>>;

    /// The file object registered for `url`.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if no file
    /// object has that URL.
    async fn file_object_pid(&self, url: &Url) -> Result<Pid>;

    /// Clone a new object from the `template` object, listing each of
    /// `old_identifiers` in its `DC` datastream. Returns the new PID.
    async fn create_object_from_template(
        &self,
        template: &Pid,
        old_identifiers: &[String],
        comment: &str,
    ) -> Result<Pid>;

    /// The object's label.
    async fn object_title(&self, pid: &Pid) -> Result<String>;

    /// Current content of a datastream.
    async fn datastream(&self, pid: &Pid, datastream: &str) -> Result<Document>;

    /// Replace (or create) a datastream's content.
    async fn update_datastream(&self, pid: &Pid, datastream: &str, document: &Document, comment: &str) -> Result<()>;

    async fn set_object_label(&self, pid: &Pid, label: &str, comment: &str) -> Result<()>;

    /// Return published objects to an editable (inactive) state.
    async fn unpublish_objects(&self, pids: &[Pid], comment: &str) -> Result<()>;

    /// Outgoing relations of `pid` with the given predicate.
    async fn object_relations(&self, pid: &Pid, predicate: &str) -> Result<Vec<Relation>>;

    /// Add a relation to its subject. Adding a relation that already exists
    /// is not an error.
    async fn add_object_relation(&self, relation: &Relation, comment: &str) -> Result<()>;

    /// Remove a relation from its subject.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the subject
    /// doesn't carry that relation.
    async fn remove_object_relation(&self, relation: &Relation, comment: &str) -> Result<()>;
}
