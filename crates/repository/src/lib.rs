pub mod client;
pub mod error;
mod models;

pub use crate::client::RepositoryClient;
pub use crate::models::{DC_DATASTREAM, Pid, Relation, RelationObject};
use std::sync::Arc;

pub type ClientHandle = Arc<dyn RepositoryClient + Send + Sync>;
