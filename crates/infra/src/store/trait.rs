use std::sync::Arc;

use thiserror::Error;

use salesdesk_core::{Entity, ExpectedVersion};

/// A document together with the store-assigned version.
///
/// Versions start at 1 on insert and increase by one on every update. They
/// back the optimistic concurrency checks of [`EntityStore::update`] and
/// [`EntityStore::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<E> {
    pub document: E,
    pub version: u64,
}

impl<E> Stored<E> {
    pub fn into_document(self) -> E {
        self.document
    }
}

/// Entity store operation error.
///
/// These are storage failures as opposed to domain errors. `Unavailable`
/// carries backend detail for logs only; services never hand it to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: &'static str, id: String },

    #[error("{collection}/{id} already exists")]
    Duplicate { collection: &'static str, id: String },

    #[error("optimistic concurrency check failed on {collection}/{id}: expected {expected:?}, found {actual}")]
    Concurrency {
        collection: &'static str,
        id: String,
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document store boundary for products, clients and orders.
///
/// Implementations must make `update` and `delete` atomic with respect to the
/// version check: two writers holding the same `ExpectedVersion::Exact(v)`
/// cannot both succeed.
#[async_trait::async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn find_by_id(&self, id: &E::Id) -> Result<Option<Stored<E>>, StoreError>;

    /// All documents matching `filter`, ordered by id.
    async fn find(&self, filter: &E::Filter) -> Result<Vec<Stored<E>>, StoreError>;

    async fn find_one(&self, filter: &E::Filter) -> Result<Option<Stored<E>>, StoreError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Persist a new document. Fails with `Duplicate` if the id is taken.
    async fn insert(&self, document: E) -> Result<Stored<E>, StoreError>;

    /// Replace the document stored under `id`.
    async fn update(
        &self,
        id: &E::Id,
        expected: ExpectedVersion,
        document: E,
    ) -> Result<Stored<E>, StoreError>;

    /// Remove a document. Returns `false` if nothing was stored under `id`.
    async fn delete(&self, id: &E::Id, expected: ExpectedVersion) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
impl<E, S> EntityStore<E> for Arc<S>
where
    E: Entity,
    S: EntityStore<E> + ?Sized,
{
    async fn find_by_id(&self, id: &E::Id) -> Result<Option<Stored<E>>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find(&self, filter: &E::Filter) -> Result<Vec<Stored<E>>, StoreError> {
        (**self).find(filter).await
    }

    async fn find_one(&self, filter: &E::Filter) -> Result<Option<Stored<E>>, StoreError> {
        (**self).find_one(filter).await
    }

    async fn insert(&self, document: E) -> Result<Stored<E>, StoreError> {
        (**self).insert(document).await
    }

    async fn update(
        &self,
        id: &E::Id,
        expected: ExpectedVersion,
        document: E,
    ) -> Result<Stored<E>, StoreError> {
        (**self).update(id, expected, document).await
    }

    async fn delete(&self, id: &E::Id, expected: ExpectedVersion) -> Result<bool, StoreError> {
        (**self).delete(id, expected).await
    }
}
