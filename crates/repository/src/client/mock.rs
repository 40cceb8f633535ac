//! In-memory repository client for testing.

use crate::RepositoryClient;
use crate::error::{ErrorKind, Result};
use crate::models::{DC_DATASTREAM, Pid, Relation};
use async_trait::async_trait;
use radiotv_extract::DC_NAMESPACE;
use radiotv_extract::dc;
use radiotv_extract::xml::{Document, Element, QName};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;
use url::Url;

const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

/// Publication state of a mock object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Published, read-only in a real repository.
    Active,
    /// Editable; freshly created objects start here.
    Inactive,
}

/// A repository object as the mock stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockObject {
    pub label: String,
    pub state: ObjectState,
    pub datastreams: BTreeMap<String, Document>,
}
impl MockObject {
    /// A published object with the given label and no datastreams.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: ObjectState::Active,
            datastreams: BTreeMap::new(),
        }
    }

    pub fn with_datastream(mut self, datastream: impl Into<String>, document: Document) -> Self {
        self.datastreams.insert(datastream.into(), document);
        self
    }

    /// List `identifiers` in the object's `DC` datastream, creating it if
    /// needed.
    pub fn with_old_identifiers<S: AsRef<str>>(mut self, identifiers: &[S]) -> Self {
        let identifiers: Vec<String> = identifiers.iter().map(|i| i.as_ref().to_string()).collect();
        let dc = self.datastreams.entry(DC_DATASTREAM.to_string()).or_insert_with(|| dublin_core(None, &[]));
        dc::add_identifiers(dc, &identifiers);
        self
    }
}

/// Every call of [`RepositoryClient`], for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    PidsForOldIdentifier,
    FileObjectPid,
    CreateObjectFromTemplate,
    ObjectTitle,
    Datastream,
    UpdateDatastream,
    SetObjectLabel,
    UnpublishObjects,
    ObjectRelations,
    AddObjectRelation,
    RemoveObjectRelation,
}

/// A successful mutating call, as recorded in the mock's audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Created { pid: Pid, template: Pid, comment: String },
    DatastreamUpdated { pid: Pid, datastream: String, comment: String },
    LabelSet { pid: Pid, label: String, comment: String },
    Unpublished { pids: Vec<Pid>, comment: String },
    RelationAdded { relation: Relation, comment: String },
    RelationRemoved { relation: Relation, comment: String },
}
impl Mutation {
    pub fn comment(&self) -> &str {
        match self {
            Self::Created { comment, .. }
            | Self::DatastreamUpdated { comment, .. }
            | Self::LabelSet { comment, .. }
            | Self::Unpublished { comment, .. }
            | Self::RelationAdded { comment, .. }
            | Self::RelationRemoved { comment, .. } => comment,
        }
    }
}

#[derive(Default)]
struct State {
    objects: BTreeMap<Pid, MockObject>,
    templates: BTreeSet<Pid>,
    files: HashMap<String, Pid>,
    relations: Vec<Relation>,
    mutations: Vec<Mutation>,
    failures: HashMap<Method, ErrorKind>,
    created: usize,
}
impl State {
    fn check(&self, method: Method) -> Result<()> {
        match self.failures.get(&method) {
            Some(kind) => Err(exn::Exn::from(kind.clone())),
            None => Ok(()),
        }
    }

    fn object_mut(&mut self, pid: &Pid) -> Result<&mut MockObject> {
        self.objects.get_mut(pid).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(pid.to_string())))
    }

    fn object(&self, pid: &Pid) -> Result<&MockObject> {
        self.objects.get(pid).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(pid.to_string())))
    }
}

/// In-memory repository client for testing.
///
/// Objects, file URLs and relations are stored behind a [`RwLock`], so all
/// trait methods can operate on `&self` without external synchronisation.
/// Every successful mutation is recorded (see [`mutations()`](Self::mutations))
/// and any method can be made to fail on demand.
///
/// # Examples
///
/// ```
/// use radiotv_repository::client::{MockObject, MockRepository};
/// use radiotv_repository::{Pid, RepositoryClient};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MockRepository::default()
///     .with_object("uuid:program", MockObject::new("News").with_old_identifiers(&["4711"]));
/// let pids = client.pids_for_old_identifier("4711").await?;
/// assert_eq!(pids, [Pid::from("uuid:program")]);
/// # Ok(())
/// # }
/// ```
pub struct MockRepository {
    name: String,
    state: RwLock<State>,
}

impl MockRepository {
    /// Change the name of the mock client.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Register an object that new objects can be cloned from.
    pub fn with_template(mut self, template: impl Into<Pid>) -> Self {
        self.state.get_mut().templates.insert(template.into());
        self
    }

    /// Register a file object under a URL.
    ///
    /// Panics if `url` doesn't parse. If test setup is wrong, then test
    /// should not pass.
    pub fn with_file(mut self, url: &str, pid: impl Into<Pid>) -> Self {
        let Ok(url) = Url::parse(url) else {
            panic!("MockRepository::with_file: invalid URL {url}");
        };
        let pid = pid.into();
        let state = self.state.get_mut();
        state.objects.entry(pid.clone()).or_insert_with(|| MockObject::new(url.as_str()));
        state.files.insert(url.into(), pid);
        self
    }

    /// Add an object. A `DC` datastream listing the PID is created unless
    /// the object already has one.
    pub fn with_object(mut self, pid: impl Into<Pid>, mut object: MockObject) -> Self {
        let pid = pid.into();
        object
            .datastreams
            .entry(DC_DATASTREAM.to_string())
            .or_insert_with(|| dublin_core(Some(&pid), &[]));
        self.state.get_mut().objects.insert(pid, object);
        self
    }

    /// Add a relation. Its subject doesn't have to exist.
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.state.get_mut().relations.push(relation);
        self
    }

    /// Make every call of `method` fail with `kind`.
    pub fn with_failure(mut self, method: Method, kind: ErrorKind) -> Self {
        self.state.get_mut().failures.insert(method, kind);
        self
    }

    /// Make every further call of `method` fail with `kind`.
    pub async fn fail(&self, method: Method, kind: ErrorKind) {
        self.state.write().await.failures.insert(method, kind);
    }

    /// Undo [`fail()`](Self::fail) for `method`.
    pub async fn recover(&self, method: Method) {
        self.state.write().await.failures.remove(&method);
    }

    /// Snapshot of a stored object.
    pub async fn object(&self, pid: &Pid) -> Option<MockObject> {
        self.state.read().await.objects.get(pid).cloned()
    }

    /// Every stored relation, in insertion order.
    pub async fn relations(&self) -> Vec<Relation> {
        self.state.read().await.relations.clone()
    }

    /// Successful mutating calls, oldest first.
    pub async fn mutations(&self) -> Vec<Mutation> {
        self.state.read().await.mutations.clone()
    }

    pub async fn clear_mutations(&self) {
        self.state.write().await.mutations.clear();
    }
}
impl Default for MockRepository {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            state: RwLock::new(State::default()),
        }
    }
}

#[async_trait]
impl RepositoryClient for MockRepository {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pids_for_old_identifier(&self, identifier: &str) -> Result<Vec<Pid>> {
        let state = self.state.read().await;
        state.check(Method::PidsForOldIdentifier)?;
        Ok(state
            .objects
            .iter()
            .filter(|(_, object)| {
                object
                    .datastreams
                    .get(DC_DATASTREAM)
                    .is_some_and(|document| dc::identifiers(document).iter().any(|i| i == identifier))
            })
            .map(|(pid, _)| pid.clone())
            .collect())
    }

    async fn file_object_pid(&self, url: &Url) -> Result<Pid> {
        let state = self.state.read().await;
        state.check(Method::FileObjectPid)?;
        state.files.get(url.as_str()).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(url.to_string())))
    }

    async fn create_object_from_template(
        &self,
        template: &Pid,
        old_identifiers: &[String],
        comment: &str,
    ) -> Result<Pid> {
        let mut state = self.state.write().await;
        state.check(Method::CreateObjectFromTemplate)?;
        if !state.templates.contains(template) {
            exn::bail!(ErrorKind::NotFound(template.to_string()));
        }
        let pid = loop {
            state.created += 1;
            let pid = Pid::new(format!("uuid:mock-{:04}", state.created));
            if !state.objects.contains_key(&pid) {
                break pid;
            }
        };
        let dc = dublin_core(Some(&pid), old_identifiers);
        let object = MockObject {
            label: String::new(),
            state: ObjectState::Inactive,
            datastreams: BTreeMap::from([(DC_DATASTREAM.to_string(), dc)]),
        };
        state.objects.insert(pid.clone(), object);
        state.mutations.push(Mutation::Created {
            pid: pid.clone(),
            template: template.clone(),
            comment: comment.to_string(),
        });
        Ok(pid)
    }

    async fn object_title(&self, pid: &Pid) -> Result<String> {
        let state = self.state.read().await;
        state.check(Method::ObjectTitle)?;
        Ok(state.object(pid)?.label.clone())
    }

    async fn datastream(&self, pid: &Pid, datastream: &str) -> Result<Document> {
        let state = self.state.read().await;
        state.check(Method::Datastream)?;
        state
            .object(pid)?
            .datastreams
            .get(datastream)
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(format!("{pid}/{datastream}"))))
    }

    async fn update_datastream(&self, pid: &Pid, datastream: &str, document: &Document, comment: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check(Method::UpdateDatastream)?;
        state.object_mut(pid)?.datastreams.insert(datastream.to_string(), document.clone());
        state.mutations.push(Mutation::DatastreamUpdated {
            pid: pid.clone(),
            datastream: datastream.to_string(),
            comment: comment.to_string(),
        });
        Ok(())
    }

    async fn set_object_label(&self, pid: &Pid, label: &str, comment: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check(Method::SetObjectLabel)?;
        state.object_mut(pid)?.label = label.to_string();
        state.mutations.push(Mutation::LabelSet {
            pid: pid.clone(),
            label: label.to_string(),
            comment: comment.to_string(),
        });
        Ok(())
    }

    async fn unpublish_objects(&self, pids: &[Pid], comment: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check(Method::UnpublishObjects)?;
        // All or nothing.
        for pid in pids {
            state.object(pid)?;
        }
        for pid in pids {
            state.object_mut(pid)?.state = ObjectState::Inactive;
        }
        state.mutations.push(Mutation::Unpublished {
            pids: pids.to_vec(),
            comment: comment.to_string(),
        });
        Ok(())
    }

    async fn object_relations(&self, pid: &Pid, predicate: &str) -> Result<Vec<Relation>> {
        let state = self.state.read().await;
        state.check(Method::ObjectRelations)?;
        state.object(pid)?;
        Ok(state
            .relations
            .iter()
            .filter(|relation| &relation.subject == pid && relation.predicate == predicate)
            .cloned()
            .collect())
    }

    async fn add_object_relation(&self, relation: &Relation, comment: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check(Method::AddObjectRelation)?;
        state.object(&relation.subject)?;
        if !state.relations.contains(relation) {
            state.relations.push(relation.clone());
        }
        state.mutations.push(Mutation::RelationAdded {
            relation: relation.clone(),
            comment: comment.to_string(),
        });
        Ok(())
    }

    async fn remove_object_relation(&self, relation: &Relation, comment: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.check(Method::RemoveObjectRelation)?;
        let position = state
            .relations
            .iter()
            .position(|r| r == relation)
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(relation.to_string())))?;
        state.relations.remove(position);
        state.mutations.push(Mutation::RelationRemoved {
            relation: relation.clone(),
            comment: comment.to_string(),
        });
        Ok(())
    }
}

/// A minimal `oai_dc:dc` document listing `pid` (if any) and then each of
/// `identifiers`.
fn dublin_core(pid: Option<&Pid>, identifiers: &[String]) -> Document {
    let identifier = |value: &str| {
        Element::new(QName::namespaced(DC_NAMESPACE, "identifier")).with_prefix("dc").with_child(value)
    };
    let mut root = Element::new(QName::namespaced(OAI_DC_NAMESPACE, "dc")).with_prefix("oai_dc");
    let values = pid.map(Pid::as_str).into_iter().chain(identifiers.iter().map(String::as_str));
    root.children.extend(values.map(|value| identifier(value).into()));
    Document::new(root)
}
