//! Document store boundary.
//!
//! Products, clients and orders are persisted as whole documents keyed by id,
//! each carrying a store-assigned version for optimistic concurrency.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEntityStore;
pub use r#trait::{EntityStore, StoreError, Stored};
