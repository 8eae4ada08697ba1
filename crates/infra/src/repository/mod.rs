//! Document repository abstraction.
//!
//! One repository per collection. Records are stored as JSON documents and
//! filtered by equality on their top-level fields, which keeps the in-memory
//! and Postgres backends in lockstep.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use storefront_core::HasLifecycle;

pub use in_memory::InMemoryRepository;
pub use postgres::{connect, ensure_schema, PostgresRepository};

/// A persisted document type.
pub trait Record:
    Serialize + DeserializeOwned + Clone + PartialEq + HasLifecycle + Send + Sync + 'static
{
    /// Collection (table partition) name.
    const COLLECTION: &'static str;

    /// Primary key.
    fn key(&self) -> Uuid;
}

/// Equality filter over top-level document fields.
///
/// Every `eq` condition must hold; when any `any_of` condition is present at
/// least one of them must hold too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    all: Vec<(String, JsonValue)>,
    any: Vec<(String, JsonValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `active = true`
    pub fn active() -> Self {
        Self::new().eq("active", true)
    }

    /// `active = true AND enabled = true`
    pub fn live() -> Self {
        Self::active().eq("enabled", true)
    }

    pub fn by_id(id: impl Into<Uuid>) -> Self {
        Self::new().eq_id("id", id)
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.all.push((field.into(), value.into()));
        self
    }

    /// Equality on a UUID-valued field (serialized as its hyphenated string).
    pub fn eq_id(self, field: impl Into<String>, id: impl Into<Uuid>) -> Self {
        let id: Uuid = id.into();
        self.eq(field, id.to_string())
    }

    pub fn any_of(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.any.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, JsonValue)] {
        &self.all
    }

    pub fn alternatives(&self) -> &[(String, JsonValue)] {
        &self.any
    }

    /// Evaluate against a serialized document.
    pub fn matches(&self, doc: &JsonValue) -> bool {
        let holds = |(field, value): &(String, JsonValue)| doc.get(field) == Some(value);
        self.all.iter().all(holds) && (self.any.is_empty() || self.any.iter().any(holds))
    }
}

/// Outcome of an update: how many documents matched, how many actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Async collection access.
///
/// `mutation` is applied to a copy of every matched record; only records whose
/// contents change are written back and counted as modified.
#[async_trait::async_trait]
pub trait Repository<R: Record>: Send + Sync {
    async fn find_one(&self, filter: &Filter) -> Result<Option<R>, RepositoryError>;

    async fn find(&self, filter: &Filter) -> Result<Vec<R>, RepositoryError>;

    async fn update_one(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError>;

    async fn update_many(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError>;

    async fn insert_one(&self, record: R) -> Result<R, RepositoryError>;
}

#[async_trait::async_trait]
impl<R, S> Repository<R> for Arc<S>
where
    R: Record,
    S: Repository<R> + ?Sized,
{
    async fn find_one(&self, filter: &Filter) -> Result<Option<R>, RepositoryError> {
        (**self).find_one(filter).await
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<R>, RepositoryError> {
        (**self).find(filter).await
    }

    async fn update_one(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError> {
        (**self).update_one(filter, mutation).await
    }

    async fn update_many(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError> {
        (**self).update_many(filter, mutation).await
    }

    async fn insert_one(&self, record: R) -> Result<R, RepositoryError> {
        (**self).insert_one(record).await
    }
}
