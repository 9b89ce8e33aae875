//! In-memory storage implementation.
//!
//! Collections live in a single map guarded by an async read-write lock. Each entry
//! holds the collection record next to its items, so a collection and its items are
//! created and looked up together.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use mea::rwlock::RwLock;
use tracing::instrument;

use schemastore_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::{Collection, Schema},
    error::{StoreError, StoreResult},
    item::Item,
    query::{ItemsResponseInfo, QueryMeta},
};

#[derive(Debug)]
struct StoredCollection {
    record: Collection,
    items: BTreeMap<String, Item>,
}

type StoreMap = BTreeMap<String, StoredCollection>;

/// Thread-safe in-memory storage backend.
///
/// `InMemoryStore` is cloneable and keeps its state behind an `Arc`, so clones share the
/// same collections. Collections are listed in name order and items in id order.
///
/// # Example
///
/// ```ignore
/// use schemastore_core::{backend::StoreBackend, collection::Collection};
/// use schemastore_memory::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// store.create_collection(Collection::builder("people").build()).await?;
/// assert_eq!(store.get_collections().await?.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> record and items
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    #[instrument(skip_all, fields(collection = %collection.name))]
    async fn create_collection(&self, collection: Collection) -> StoreResult<()> {
        let mut store = self.store.write().await;

        if store.contains_key(&collection.name) {
            return Err(StoreError::CollectionAlreadyExists(collection.name));
        }

        store.insert(
            collection.name.clone(),
            StoredCollection {
                record: collection,
                items: BTreeMap::new(),
            },
        );

        Ok(())
    }

    #[instrument(skip_all)]
    async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
        let store = self.store.read().await;
        Ok(store.values().map(|stored| stored.record.clone()).collect())
    }

    #[instrument(skip_all, fields(collection = %collection))]
    async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
        self.store
            .read()
            .await
            .get(collection)
            .map(|stored| stored.record.schema.clone())
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))
    }

    #[instrument(skip_all, fields(collection = %collection, item = %id))]
    async fn insert_item(&self, collection: &str, id: &str, item: Item) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let stored = match store.get_mut(collection) {
            Some(stored) => stored,
            None => return Err(StoreError::CollectionNotFound(collection.to_string())),
        };

        if stored.items.contains_key(id) {
            return Err(StoreError::ItemAlreadyExists(id.to_string(), collection.to_string()));
        }

        stored.items.insert(id.to_string(), item);

        Ok(())
    }

    #[instrument(skip_all, fields(collection = %collection, item = %id))]
    async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
        let store = self.store.read().await;
        let stored = match store.get(collection) {
            Some(stored) => stored,
            None => return Err(StoreError::CollectionNotFound(collection.to_string())),
        };

        stored
            .items
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::ItemNotFound(id.to_string(), collection.to_string()))
    }

    #[instrument(skip_all, fields(collection = %collection))]
    async fn get_items(
        &self,
        collection: &str,
        _query: &QueryMeta,
    ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
        let store = self.store.read().await;
        let stored = match store.get(collection) {
            Some(stored) => stored,
            None => return Err(StoreError::CollectionNotFound(collection.to_string())),
        };

        Ok((
            stored.items.values().cloned().collect(),
            ItemsResponseInfo::new(),
        ))
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// Takes no options; present so the in-memory store is built the same way as every
/// other backend.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new, empty [`InMemoryStore`]. Never fails.
    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn object(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryStore::builder().build().await.unwrap();
        let clone = store.clone();

        store
            .create_collection(Collection::builder("people").build())
            .await
            .unwrap();

        assert_eq!(clone.get_collections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn collections_listed_by_name() {
        let store = InMemoryStore::new();
        for name in ["zebras", "apes", "moths"] {
            store
                .create_collection(Collection::builder(name).build())
                .await
                .unwrap();
        }

        let names = store
            .get_collections()
            .await
            .unwrap()
            .into_iter()
            .map(|collection| collection.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["apes", "moths", "zebras"]);
    }

    #[tokio::test]
    async fn items_listed_by_id() {
        let store = InMemoryStore::new();
        store
            .create_collection(Collection::builder("people").build())
            .await
            .unwrap();
        for id in ["c", "a", "b"] {
            store
                .insert_item("people", id, object(json!({ "_id": id })))
                .await
                .unwrap();
        }

        let (items, info) = store
            .get_items("people", &QueryMeta::default())
            .await
            .unwrap();
        let ids = items
            .iter()
            .map(|item| item["_id"].as_str().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(info, ItemsResponseInfo::new());
    }

    #[tokio::test]
    async fn insert_into_unknown_collection_fails() {
        let store = InMemoryStore::new();

        let err = store
            .insert_item("ghosts", "casper", Item::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::CollectionNotFound(name) if name == "ghosts"));
    }
}
