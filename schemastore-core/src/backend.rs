//! Storage backend abstraction for the schema store.
//!
//! This module defines the traits that abstract over different storage implementations,
//! allowing the [`Manager`](crate::manager::Manager) to work with any backend (in-memory,
//! MongoDB, ...) without importing backend-specific crates.
//!
//! # Overview
//!
//! The [`StoreBackend`] trait provides a unified async interface for the persistence
//! primitives the manager needs: storing collection records, looking up schemas, and
//! inserting and reading items. Implementations are required to be thread-safe
//! (`Send + Sync`) and support concurrent access.
//!
//! Backends do not validate anything. Validation and identity assignment happen in the
//! manager before a backend is called.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! Drivers, which build backends from a [`DriverConfig`](crate::registry::DriverConfig),
//! live in [`registry`](crate::registry).
//!
//! # Examples
//!
//! ```ignore
//! use schemastore_core::{backend::StoreBackend, collection::Collection};
//!
//! let backend = MyBackendImpl::new();
//!
//! backend.create_collection(Collection::builder("people").build()).await?;
//! backend.insert_item("people", "ada", item).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    collection::{Collection, Schema},
    error::StoreResult,
    item::Item,
    query::{ItemsResponseInfo, QueryMeta},
};

/// Abstract interface for schema store backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. Backends are the only place where uniqueness is enforced: a collection
/// name and a `(collection, item id)` pair must each be inserted at most once, even
/// under concurrent writers.
///
/// # Error Handling
///
/// Operations return [`StoreResult<T>`](crate::error::StoreResult). Missing collections
/// and items map to the not-found variants, uniqueness violations to the conflict
/// variants, and anything else to [`StoreError::Backend`](crate::error::StoreError::Backend)
/// with the operation and collection name attached.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Persists a new collection record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CollectionAlreadyExists`](crate::error::StoreError::CollectionAlreadyExists)
    /// if a collection with the same name was created before.
    async fn create_collection(&self, collection: Collection) -> StoreResult<()>;

    /// Lists every collection record, in backend-defined order.
    async fn get_collections(&self) -> StoreResult<Vec<Collection>>;

    /// Returns the schema stored for a collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CollectionNotFound`](crate::error::StoreError::CollectionNotFound)
    /// if the collection does not exist.
    async fn get_schema(&self, collection: &str) -> StoreResult<Schema>;

    /// Inserts an item under the given id.
    ///
    /// The item already carries its `_id` field. A second insert with the same id is
    /// rejected with [`StoreError::ItemAlreadyExists`](crate::error::StoreError::ItemAlreadyExists).
    async fn insert_item(&self, collection: &str, id: &str, item: Item) -> StoreResult<()>;

    /// Retrieves a single item by id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the collection or the item does not exist.
    async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item>;

    /// Lists the items of a collection.
    ///
    /// Backends may ignore the paging fields of `query` and return every item.
    async fn get_items(
        &self,
        collection: &str,
        query: &QueryMeta,
    ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)>;

    /// Cleanly shuts down the backend, releasing connections and other resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend + ?Sized,
{
    async fn create_collection(&self, collection: Collection) -> StoreResult<()> {
        (**self).create_collection(collection).await
    }

    async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
        (**self).get_collections().await
    }

    async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
        (**self).get_schema(collection).await
    }

    async fn insert_item(&self, collection: &str, id: &str, item: Item) -> StoreResult<()> {
        (**self)
            .insert_item(collection, id, item)
            .await
    }

    async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
        (**self).get_item(collection, id).await
    }

    async fn get_items(
        &self,
        collection: &str,
        query: &QueryMeta,
    ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
        (**self).get_items(collection, query).await
    }

    async fn shutdown(&self) -> StoreResult<()> {
        (**self).shutdown().await
    }
}

#[async_trait]
impl<B> StoreBackend for Box<B>
where
    B: StoreBackend + ?Sized,
{
    async fn create_collection(&self, collection: Collection) -> StoreResult<()> {
        (**self).create_collection(collection).await
    }

    async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
        (**self).get_collections().await
    }

    async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
        (**self).get_schema(collection).await
    }

    async fn insert_item(&self, collection: &str, id: &str, item: Item) -> StoreResult<()> {
        (**self)
            .insert_item(collection, id, item)
            .await
    }

    async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
        (**self).get_item(collection, id).await
    }

    async fn get_items(
        &self,
        collection: &str,
        query: &QueryMeta,
    ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
        (**self).get_items(collection, query).await
    }

    async fn shutdown(&self) -> StoreResult<()> {
        (**self).shutdown().await
    }
}

#[async_trait]
impl<B> StoreBackend for Arc<B>
where
    B: StoreBackend + ?Sized,
{
    async fn create_collection(&self, collection: Collection) -> StoreResult<()> {
        (**self).create_collection(collection).await
    }

    async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
        (**self).get_collections().await
    }

    async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
        (**self).get_schema(collection).await
    }

    async fn insert_item(&self, collection: &str, id: &str, item: Item) -> StoreResult<()> {
        (**self)
            .insert_item(collection, id, item)
            .await
    }

    async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
        (**self).get_item(collection, id).await
    }

    async fn get_items(
        &self,
        collection: &str,
        query: &QueryMeta,
    ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
        (**self).get_items(collection, query).await
    }

    async fn shutdown(&self) -> StoreResult<()> {
        (**self).shutdown().await
    }
}

/// A type-erased backend, as produced by the [`DriverRegistry`](crate::registry::DriverRegistry).
pub type DynStoreBackend = Box<dyn StoreBackend>;

/// Factory trait for building a concrete backend.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
