use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use salesdesk_core::{Entity, ExpectedVersion};

use super::r#trait::{EntityStore, StoreError, Stored};

/// In-memory document store.
///
/// Intended for tests/dev. One collection per instance.
#[derive(Debug)]
pub struct InMemoryEntityStore<E: Entity> {
    documents: RwLock<BTreeMap<E::Id, Stored<E>>>,
}

impl<E: Entity> InMemoryEntityStore<E> {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Entity> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl<E: Entity> EntityStore<E> for InMemoryEntityStore<E> {
    async fn find_by_id(&self, id: &E::Id) -> Result<Option<Stored<E>>, StoreError> {
        let map = self.documents.read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    async fn find(&self, filter: &E::Filter) -> Result<Vec<Stored<E>>, StoreError> {
        let map = self.documents.read().map_err(poisoned)?;
        Ok(map
            .values()
            .filter(|s| s.document.matches(filter))
            .cloned()
            .collect())
    }

    async fn insert(&self, document: E) -> Result<Stored<E>, StoreError> {
        let mut map = self.documents.write().map_err(poisoned)?;
        let id = document.id().clone();
        if map.contains_key(&id) {
            return Err(StoreError::Duplicate {
                collection: E::COLLECTION,
                id: id.to_string(),
            });
        }
        let stored = Stored { document, version: 1 };
        map.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: &E::Id,
        expected: ExpectedVersion,
        document: E,
    ) -> Result<Stored<E>, StoreError> {
        if document.id() != id {
            return Err(StoreError::Unavailable(format!(
                "{}: document id {} does not match key {id}",
                E::COLLECTION,
                document.id()
            )));
        }

        let mut map = self.documents.write().map_err(poisoned)?;
        let slot = map.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: E::COLLECTION,
            id: id.to_string(),
        })?;

        if !expected.matches(slot.version) {
            return Err(StoreError::Concurrency {
                collection: E::COLLECTION,
                id: id.to_string(),
                expected,
                actual: slot.version,
            });
        }

        slot.document = document;
        slot.version += 1;
        Ok(slot.clone())
    }

    async fn delete(&self, id: &E::Id, expected: ExpectedVersion) -> Result<bool, StoreError> {
        let mut map = self.documents.write().map_err(poisoned)?;
        let Some(current) = map.get(id) else {
            return Ok(false);
        };
        if !expected.matches(current.version) {
            return Err(StoreError::Concurrency {
                collection: E::COLLECTION,
                id: id.to_string(),
                expected,
                actual: current.version,
            });
        }
        map.remove(id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdesk_inventory::{NewProduct, Product, ProductFilter, ProductId};

    fn product(name: &str, stock: u32) -> Product {
        Product::create(
            ProductId::generate(),
            NewProduct {
                name: name.to_string(),
                stock,
                price: 100,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryEntityStore::new();
        let p = product("Laptop", 3);
        let stored = store.insert(p.clone()).await.unwrap();
        assert_eq!(stored.version, 1);

        let found = store.find_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(found.document, p);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = InMemoryEntityStore::new();
        let p = product("Laptop", 3);
        store.insert(p.clone()).await.unwrap();
        assert!(matches!(
            store.insert(p).await,
            Err(StoreError::Duplicate { collection: "productos", .. })
        ));
    }

    #[tokio::test]
    async fn update_bumps_version_and_checks_expectation() {
        let store = InMemoryEntityStore::new();
        let mut p = product("Laptop", 3);
        store.insert(p.clone()).await.unwrap();

        p.stock = 2;
        let stored = store.update(&p.id, ExpectedVersion::Exact(1), p.clone()).await.unwrap();
        assert_eq!(stored.version, 2);

        p.stock = 1;
        let err = store.update(&p.id, ExpectedVersion::Exact(1), p.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::Concurrency { actual: 2, .. }));
        assert_eq!(store.find_by_id(&p.id).await.unwrap().unwrap().document.stock, 2);
    }

    #[tokio::test]
    async fn update_of_missing_document_is_not_found() {
        let store = InMemoryEntityStore::new();
        let p = product("Laptop", 3);
        assert!(matches!(
            store.update(&p.id, ExpectedVersion::Any, p.clone()).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = InMemoryEntityStore::new();
        let p = product("Laptop", 3);
        store.insert(p.clone()).await.unwrap();

        assert!(store.delete(&p.id, ExpectedVersion::Any).await.unwrap());
        assert!(!store.delete(&p.id, ExpectedVersion::Any).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn find_filters_documents() {
        let store = InMemoryEntityStore::new();
        store.insert(product("Laptop", 1)).await.unwrap();
        store.insert(product("Mouse", 1)).await.unwrap();

        let filter = ProductFilter {
            name: Some("Mouse".to_string()),
        };
        let found = store.find(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].document.name, "Mouse");

        let one = store.find_one(&ProductFilter::default()).await.unwrap();
        assert!(one.is_some());
    }
}
