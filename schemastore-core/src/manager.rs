//! The manager: validating facade over one storage backend.
//!
//! [`Manager`] owns no documents. Every operation checks its input, assigns identity
//! where needed and hands persistence to the bound [`StoreBackend`]. It holds nothing
//! but the backend handle, so a single manager can be shared by any number of tasks.
//!
//! # Example
//!
//! ```ignore
//! use schemastore_core::manager::Manager;
//! use serde_json::json;
//!
//! let manager = Manager::builder().with_backend(backend).build()?;
//!
//! manager.create_collection("people", schema, Default::default()).await?;
//! let id = manager.save_item("people", json!({ "firstName": "Ada" }).as_object().cloned().unwrap()).await?;
//! let ada = manager.get_item("people", &id).await?;
//! ```

use tracing::{debug, instrument, warn};

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::{Collection, Metadata, Schema},
    error::{StoreError, StoreResult},
    item::{Item, assign_item_id},
    query::{ItemsResponseInfo, QueryMeta},
    validation::CompiledSchema,
};

/// Validates collections and items, then delegates to a storage backend.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type. Defaults to the boxed backend returned by
///   the [`DriverRegistry`](crate::registry::DriverRegistry).
#[derive(Debug)]
pub struct Manager<B: StoreBackend = DynStoreBackend> {
    backend: B,
}

impl<B: StoreBackend> Manager<B> {
    /// Creates a manager bound to the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Creates a builder. [`ManagerBuilder::build`] fails if no backend was bound.
    pub fn builder() -> ManagerBuilder<B> {
        ManagerBuilder::new()
    }

    /// The bound backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a new collection governed by `schema`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidCollectionName`] if `name` is empty
    /// - [`StoreError::SchemaCompile`] if `schema` is not a valid JSON Schema; nothing is stored
    /// - [`StoreError::CollectionAlreadyExists`] if the backend already has the name
    #[instrument(skip_all, fields(collection = %name))]
    pub async fn create_collection(
        &self,
        name: &str,
        schema: Schema,
        metadata: Metadata,
    ) -> StoreResult<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidCollectionName(name.to_string()));
        }

        if let Err(err) = CompiledSchema::compile(&schema) {
            debug!(error = %err, "rejected collection schema");
            return Err(err);
        }

        self.backend
            .create_collection(Collection::new(name, schema, metadata))
            .await
            .inspect_err(|err| log_backend_error("create_collection", err))
    }

    /// Lists every collection.
    #[instrument(skip_all)]
    pub async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
        self.backend
            .get_collections()
            .await
            .inspect_err(|err| log_backend_error("get_collections", err))
    }

    /// Returns the schema of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CollectionNotFound`] if the collection does not exist.
    #[instrument(skip_all, fields(collection = %collection))]
    pub async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
        self.backend
            .get_schema(collection)
            .await
            .inspect_err(|err| log_backend_error("get_schema", err))
    }

    /// Validates `item` against the collection's schema and stores it.
    ///
    /// A non-empty string `_id` in the item is used as its identity; otherwise a new id
    /// is generated and written into the item. Returns the id the item was stored under.
    ///
    /// # Errors
    ///
    /// - [`StoreError::CollectionNotFound`] if the collection does not exist
    /// - [`StoreError::Validation`] with every violated rule if the item is invalid
    /// - [`StoreError::ItemAlreadyExists`] if the id is already taken
    #[instrument(skip_all, fields(collection = %collection))]
    pub async fn save_item(&self, collection: &str, mut item: Item) -> StoreResult<String> {
        let schema = self
            .backend
            .get_schema(collection)
            .await
            .inspect_err(|err| log_backend_error("get_schema", err))?;

        if let Err(errors) = CompiledSchema::compile(&schema)?.validate(&item) {
            debug!(violations = errors.len(), "item failed validation");
            return Err(StoreError::Validation(errors));
        }

        let id = assign_item_id(&mut item);

        self.backend
            .insert_item(collection, &id, item)
            .await
            .inspect_err(|err| log_backend_error("insert_item", err))?;
        debug!(item = %id, "saved item");

        Ok(id)
    }

    /// Returns a single item.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the collection or item does not exist.
    #[instrument(skip_all, fields(collection = %collection, item = %id))]
    pub async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
        self.backend
            .get_item(collection, id)
            .await
            .inspect_err(|err| log_backend_error("get_item", err))
    }

    /// Lists the items of a collection along with (currently empty) response metadata.
    #[instrument(skip_all, fields(collection = %collection))]
    pub async fn get_items(
        &self,
        collection: &str,
        query: &QueryMeta,
    ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
        self.backend
            .get_items(collection, query)
            .await
            .inspect_err(|err| log_backend_error("get_items", err))
    }

    /// Shuts down the manager and releases backend resources.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await
    }
}

fn log_backend_error(operation: &'static str, err: &StoreError) {
    if matches!(err, StoreError::Backend { .. } | StoreError::Serialization(_)) {
        warn!(operation, error = %err, "storage backend failure");
    } else {
        debug!(operation, error = %err, "request rejected by backend");
    }
}

/// Builder for [`Manager`].
#[derive(Debug)]
pub struct ManagerBuilder<B: StoreBackend> {
    backend: Option<B>,
}

impl<B: StoreBackend> ManagerBuilder<B> {
    pub fn new() -> Self {
        Self { backend: None }
    }

    /// Binds the backend the manager will delegate to.
    pub fn with_backend(mut self, backend: B) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Builds the manager.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if no backend was bound.
    pub fn build(self) -> StoreResult<Manager<B>> {
        self.backend
            .map(Manager::new)
            .ok_or_else(|| {
                StoreError::Configuration("manager initialization failed: no storage backend".into())
            })
    }
}

impl<B: StoreBackend> Default for ManagerBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;

    /// Records every call and keeps a single collection in memory.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<String>>,
        schema: Mutex<Option<Schema>>,
        items: Mutex<Vec<(String, Item)>>,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl StoreBackend for RecordingBackend {
        async fn create_collection(&self, collection: Collection) -> StoreResult<()> {
            self.record("create_collection");
            *self.schema.lock().unwrap() = Some(collection.schema);
            Ok(())
        }

        async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
            self.record("get_collections");
            Ok(vec![])
        }

        async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
            self.record("get_schema");
            self.schema
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))
        }

        async fn insert_item(&self, _collection: &str, id: &str, item: Item) -> StoreResult<()> {
            self.record("insert_item");
            self.items.lock().unwrap().push((id.to_string(), item));
            Ok(())
        }

        async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
            self.record("get_item");
            Err(StoreError::ItemNotFound(id.to_string(), collection.to_string()))
        }

        async fn get_items(
            &self,
            _collection: &str,
            _query: &QueryMeta,
        ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
            self.record("get_items");
            Ok((vec![], ItemsResponseInfo::default()))
        }
    }

    fn object(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn people_schema() -> Schema {
        object(json!({
            "type": "object",
            "required": ["firstName"],
            "properties": { "firstName": { "type": "string" } }
        }))
    }

    #[test]
    fn builder_without_backend_fails() {
        let err = ManagerBuilder::<RecordingBackend>::new().build().unwrap_err();

        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[tokio::test]
    async fn malformed_schema_is_never_persisted() {
        let manager = Manager::builder()
            .with_backend(RecordingBackend::default())
            .build()
            .unwrap();

        let err = manager
            .create_collection("people", object(json!({ "type": 42 })), Metadata::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::SchemaCompile(_)));
        assert!(manager.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn empty_collection_name_is_rejected() {
        let manager = Manager::new(RecordingBackend::default());

        let err = manager
            .create_collection("", people_schema(), Metadata::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidCollectionName(_)));
        assert!(manager.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_item_stops_before_insert() {
        let manager = Manager::new(RecordingBackend::default());
        manager
            .create_collection("people", people_schema(), Metadata::new())
            .await
            .unwrap();

        let err = manager
            .save_item("people", Item::new())
            .await
            .unwrap_err();

        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].keyword, "required");
        assert!(errors.issues()[0].message.contains("firstName"));
        assert_eq!(
            manager.backend().calls(),
            vec!["create_collection".to_string(), "get_schema".to_string()]
        );
    }

    #[tokio::test]
    async fn save_item_passes_assigned_id_to_backend() {
        let manager = Manager::new(RecordingBackend::default());
        manager
            .create_collection("people", people_schema(), Metadata::new())
            .await
            .unwrap();

        let generated = manager
            .save_item("people", object(json!({ "firstName": "Ada" })))
            .await
            .unwrap();
        let supplied = manager
            .save_item("people", object(json!({ "_id": "grace", "firstName": "Grace" })))
            .await
            .unwrap();

        let items = manager.backend().items.lock().unwrap().clone();
        assert_eq!(supplied, "grace");
        assert_eq!(items[0].0, generated);
        assert_eq!(items[0].1["_id"], Value::String(generated.clone()));
        assert_eq!(items[1].0, "grace");
        assert_eq!(items[1].1["firstName"], "Grace");
    }

    #[tokio::test]
    async fn save_item_into_unknown_collection_is_not_found() {
        let manager = Manager::new(RecordingBackend::default());

        let err = manager
            .save_item("ghosts", object(json!({ "name": "Casper" })))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!manager.backend().calls().contains(&"insert_item".to_string()));
    }
}
