//! Creating or updating a single program object.

use crate::comment::Change;
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::identity::{self, Equivalence};
use crate::relations::{self, RelationChanges};
use crate::{files, identifiers};
use derive_more::Display;
use exn::ResultExt;
use radiotv_extract::Extractor;
use radiotv_extract::models::Program;
use radiotv_extract::xml::Document;
use radiotv_repository::{ClientHandle, Pid, RepositoryClient};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// What happened to the program object.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No object listed any of the record's old identifiers; one was created
    /// from the template.
    Created,
    /// An existing object was overwritten.
    Updated,
    /// An existing object already matched the record; nothing was written.
    Unchanged,
}

/// The (successful) result of ingesting a single program record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub pid: Pid,
    pub outcome: Outcome,
    /// Result of comparing an existing object against the record. `None`
    /// when the object was created or checking is disabled.
    pub equivalence: Option<Equivalence>,
    pub relations: RelationChanges,
}

/// Creates or updates program objects from program records.
///
/// Ingests through the same creator are serialised: while one
/// [`ingest_program`](Self::ingest_program) is running, the next waits. Use
/// one creator per concurrent ingest (as [`ingest`](crate::ingest) does).
pub struct RecordCreator {
    client: ClientHandle,
    context: Arc<Context>,
    lock: Mutex<()>,
}
impl RecordCreator {
    pub fn new(client: ClientHandle, context: impl Into<Arc<Context>>) -> Self {
        Self {
            client,
            context: context.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Ingests a program record, creating the program object if no object
    /// lists any of its old identifiers and updating the existing one
    /// otherwise.
    ///
    /// In order:
    ///
    /// 1. every file URL is resolved to its file object,
    /// 2. an existing object is looked up by old identifier,
    /// 3. when checking is enabled, an existing object that already matches
    ///    the record is returned untouched,
    /// 4. an existing object is unpublished and given any old identifiers it
    ///    lacks, or a new object is created,
    /// 5. the label and all four metadata datastreams are written,
    /// 6. has-file relations are made to match the file URLs exactly.
    ///
    /// `filename` only appears in logs and audit comments.
    ///
    /// # Errors
    ///
    /// Nothing is written if the record lacks metadata
    /// ([`ErrorKind::Metadata`]), a file URL is bad
    /// ([`ErrorKind::MalformedUrl`], [`ErrorKind::FileNotFound`]), the lookup
    /// fails ([`ErrorKind::ObjectLookup`]) or an existing object may not be
    /// overwritten ([`ErrorKind::OverwriteForbidden`]). A
    /// [`ErrorKind::Repository`] failure later on leaves the object partially
    /// updated; ingesting the record again completes it.
    #[instrument(skip(self, metadata), fields(client = self.client.name(), pid = tracing::field::Empty))]
    pub async fn ingest_program(&self, metadata: &Document, filename: &str) -> Result<Ingested> {
        let _guard = self.lock.lock().await;
        let session = Session {
            client: self.client.as_ref(),
            context: &self.context,
            filename,
        };
        let program = Extractor::new(metadata).program().or_raise(|| ErrorKind::Metadata)?;
        session.ingest(&program).await
    }
}

/// A single ingest in progress.
pub(crate) struct Session<'a> {
    pub(crate) client: &'a dyn RepositoryClient,
    pub(crate) context: &'a Context,
    pub(crate) filename: &'a str,
}
impl Session<'_> {
    pub(crate) fn comment(&self, change: Change<'_>) -> Result<String> {
        self.context.commenter.render(self.filename, change)
    }

    async fn ingest(&self, program: &Program) -> Result<Ingested> {
        // Resolve files first, so a bad record fails before anything is written.
        let files = files::resolve(self.client, &program.file_urls).await?;
        tracing::debug!(?files, "Resolved file objects");
        tracing::debug!(old_identifiers = ?program.old_identifiers, "Looking for existing program object");

        let (pid, outcome, equivalence) = match identifiers::find_existing(self.client, &program.old_identifiers).await? {
            Some(pid) => {
                tracing::Span::current().record("pid", pid.as_str());
                tracing::info!(%pid, "Program object already exists");
                let equivalence = if self.context.check {
                    Some(identity::check(self.client, &pid, program, &files, &self.context.has_file_relation).await)
                } else {
                    None
                };
                if equivalence.as_ref().is_some_and(Equivalence::is_identical) {
                    tracing::info!(%pid, "Program object is identical to record, nothing to update");
                    return Ok(Ingested {
                        pid,
                        outcome: Outcome::Unchanged,
                        equivalence,
                        relations: RelationChanges::default(),
                    });
                }
                if !self.context.overwrite {
                    exn::bail!(ErrorKind::OverwriteForbidden(pid));
                }
                self.prepare_overwrite(&pid, &program.old_identifiers).await?;
                (pid, Outcome::Updated, equivalence)
            },
            None => {
                let pid = self.create(&program.old_identifiers).await?;
                tracing::Span::current().record("pid", pid.as_str());
                (pid, Outcome::Created, None)
            },
        };

        self.write_metadata(&pid, program).await?;
        let relations = relations::reconcile(self, &pid, &files).await?;

        tracing::info!(%pid, %outcome, added = relations.added.len(), removed = relations.removed.len(), "Ingested program");
        Ok(Ingested {
            pid,
            outcome,
            equivalence,
            relations,
        })
    }

    async fn create(&self, old_identifiers: &[String]) -> Result<Pid> {
        let comment = self.comment(Change::Created)?;
        let pid = self
            .client
            .create_object_from_template(&self.context.template, old_identifiers, &comment)
            .await
            .or_raise(|| ErrorKind::Repository)?;
        tracing::info!(%pid, template = %self.context.template, "Created program object");
        Ok(pid)
    }

    async fn prepare_overwrite(&self, pid: &Pid, old_identifiers: &[String]) -> Result<()> {
        let comment = self.comment(Change::Unpublished)?;
        self.client
            .unpublish_objects(std::slice::from_ref(pid), &comment)
            .await
            .or_raise(|| ErrorKind::Repository)?;
        tracing::debug!(%pid, "Unpublished program object");
        identifiers::merge_into_dc(self, pid, old_identifiers).await?;
        Ok(())
    }

    /// Label from title, then every fragment to its datastream.
    async fn write_metadata(&self, pid: &Pid, program: &Program) -> Result<()> {
        let comment = self.comment(Change::Label(&program.title))?;
        self.client.set_object_label(pid, &program.title, &comment).await.or_raise(|| ErrorKind::Repository)?;

        let comment = self.comment(Change::Datastream)?;
        for (fragment, document) in program.fragments.iter() {
            tracing::debug!(%pid, datastream = fragment.datastream_id(), "Writing datastream");
            self.client
                .update_datastream(pid, fragment.datastream_id(), document, &comment)
                .await
                .or_raise(|| ErrorKind::Repository)?;
        }
        Ok(())
    }
}
