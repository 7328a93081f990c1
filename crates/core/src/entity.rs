//! Entity trait: identity + the collection a document is stored in.

/// A document that can be persisted in an entity store.
///
/// Entities are plain values; the store owns versioning. `Filter` is the
/// entity-specific query shape used by `find`/`find_one` (an owner, a status,
/// an e-mail address, ...).
pub trait Entity: Clone + Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: Clone
        + Eq
        + Ord
        + core::hash::Hash
        + core::fmt::Debug
        + core::fmt::Display
        + Send
        + Sync
        + 'static;

    /// Query shape accepted by the store for this entity.
    type Filter: core::fmt::Debug + Send + Sync;

    /// Name of the collection, used in logs and not-found errors.
    const COLLECTION: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether this document satisfies `filter`.
    fn matches(&self, filter: &Self::Filter) -> bool;
}
