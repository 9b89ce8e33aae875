//! Driver registry: resolves a configured driver name to a live backend.
//!
//! Backend crates register a [`Driver`] under a unique name while the process starts
//! up. The bootstrap path then calls [`DriverRegistry::connect`] with the driver name
//! from its configuration, so neither the manager nor the caller depends on a concrete
//! backend crate.
//!
//! The registry is an ordinary value: build one at startup and pass it to whatever
//! needs to register or connect.
//!
//! # Example
//!
//! ```ignore
//! use schemastore_core::registry::{DriverConfig, DriverRegistry};
//!
//! let registry = DriverRegistry::new();
//! schemastore_memory::register(&registry);
//!
//! let backend = registry.connect("memory", &DriverConfig::new("memory")).await?;
//! ```

use std::{collections::HashMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    backend::DynStoreBackend,
    error::{StoreError, StoreResult},
};

/// Default name of the collection that holds collection records.
pub const DEFAULT_SCHEMA_COLLECTION: &str = "_schemas";

/// Connection parameters handed to a [`Driver`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Name of the registered driver to use, e.g. `mongodb`.
    pub driver_type: String,
    /// Driver specific connection string.
    #[serde(default)]
    pub connection_string: String,
    /// Name of the database to store collections in.
    #[serde(default)]
    pub database_name: String,
    /// Name of the collection that holds collection records and their schemas.
    #[serde(default = "default_schema_collection")]
    pub schema_collection_name: String,
}

fn default_schema_collection() -> String {
    DEFAULT_SCHEMA_COLLECTION.to_string()
}

impl DriverConfig {
    /// Creates a configuration for the given driver with every other field defaulted.
    pub fn new(driver_type: impl Into<String>) -> Self {
        Self {
            driver_type: driver_type.into(),
            connection_string: String::new(),
            database_name: String::new(),
            schema_collection_name: default_schema_collection(),
        }
    }

    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = connection_string.into();
        self
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }

    pub fn with_schema_collection_name(mut self, name: impl Into<String>) -> Self {
        self.schema_collection_name = name.into();
        self
    }
}

/// A storage driver: knows how to connect to one kind of backend.
#[async_trait]
pub trait Driver: Send + Sync + Debug {
    /// Connects to the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Initialization`] when the connection cannot be established.
    async fn connect(&self, config: &DriverConfig) -> StoreResult<DynStoreBackend>;
}

/// Table of registered drivers, keyed by name.
///
/// Registration takes the write lock, lookups the read lock. The lock is never held
/// across a driver's `connect`.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a driver under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or a driver is already registered under `name`.
    /// Registration happens once at startup, so both are programming errors.
    pub fn register<D>(&self, name: &str, driver: D)
    where
        D: Driver + 'static,
    {
        if let Err(err) = self.try_register(name, driver) {
            panic!("schemastore: {err}");
        }
    }

    /// Registers a driver under `name`, reporting duplicates instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if `name` is empty or already taken.
    pub fn try_register<D>(&self, name: &str, driver: D) -> StoreResult<()>
    where
        D: Driver + 'static,
    {
        if name.is_empty() {
            return Err(StoreError::Configuration(
                "driver name must not be empty".to_string(),
            ));
        }

        let mut drivers = self.drivers.write();

        if drivers.contains_key(name) {
            return Err(StoreError::Configuration(format!(
                "driver {name} registered twice"
            )));
        }

        drivers.insert(name.to_string(), Arc::new(driver));
        debug!(driver = name, "registered storage driver");

        Ok(())
    }

    /// Returns `true` if a driver is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.drivers.read().contains_key(name)
    }

    /// Names of all registered drivers, sorted.
    pub fn drivers(&self) -> Vec<String> {
        let mut names = self
            .drivers
            .read()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Connects to the backend of the driver registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DriverNotFound`] if no such driver exists, or whatever the
    /// driver's own `connect` fails with.
    pub async fn connect(&self, name: &str, config: &DriverConfig) -> StoreResult<DynStoreBackend> {
        let driver = self
            .drivers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::DriverNotFound(name.to_string()))?;

        let backend = driver.connect(config).await?;
        info!(driver = name, database = %config.database_name, "connected storage backend");

        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::StoreBackend,
        collection::{Collection, Schema},
        item::Item,
        query::{ItemsResponseInfo, QueryMeta},
    };

    #[derive(Debug)]
    struct NullBackend;

    #[async_trait]
    impl StoreBackend for NullBackend {
        async fn create_collection(&self, _collection: Collection) -> StoreResult<()> {
            Ok(())
        }

        async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
            Ok(vec![])
        }

        async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
            Err(StoreError::CollectionNotFound(collection.to_string()))
        }

        async fn insert_item(&self, _collection: &str, _id: &str, _item: Item) -> StoreResult<()> {
            Ok(())
        }

        async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
            Err(StoreError::ItemNotFound(id.to_string(), collection.to_string()))
        }

        async fn get_items(
            &self,
            _collection: &str,
            _query: &QueryMeta,
        ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
            Ok((vec![], ItemsResponseInfo::default()))
        }
    }

    #[derive(Debug)]
    struct NullDriver;

    #[async_trait]
    impl Driver for NullDriver {
        async fn connect(&self, _config: &DriverConfig) -> StoreResult<DynStoreBackend> {
            Ok(Box::new(NullBackend))
        }
    }

    #[derive(Debug)]
    struct UnreachableDriver;

    #[async_trait]
    impl Driver for UnreachableDriver {
        async fn connect(&self, config: &DriverConfig) -> StoreResult<DynStoreBackend> {
            Err(StoreError::Initialization(format!(
                "cannot reach {}",
                config.connection_string
            )))
        }
    }

    #[tokio::test]
    async fn connects_registered_driver() {
        let registry = DriverRegistry::new();
        registry.register("null", NullDriver);

        let backend = registry
            .connect("null", &DriverConfig::new("null"))
            .await
            .unwrap();

        assert!(backend.get_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_driver_is_not_found() {
        let registry = DriverRegistry::new();
        registry.register("null", NullDriver);

        let err = registry
            .connect("unregistered-driver", &DriverConfig::new("unregistered-driver"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DriverNotFound(name) if name == "unregistered-driver"));
        assert_eq!(registry.drivers(), vec!["null".to_string()]);
    }

    #[tokio::test]
    async fn connection_failure_is_propagated() {
        let registry = DriverRegistry::new();
        registry.register("unreachable", UnreachableDriver);

        let config = DriverConfig::new("unreachable").with_connection_string("tcp://nowhere");
        let err = registry.connect("unreachable", &config).await.unwrap_err();

        assert!(matches!(err, StoreError::Initialization(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn try_register_rejects_duplicates_and_empty_names() {
        let registry = DriverRegistry::new();

        assert!(registry.try_register("null", NullDriver).is_ok());
        assert!(matches!(
            registry.try_register("null", NullDriver),
            Err(StoreError::Configuration(_))
        ));
        assert!(matches!(
            registry.try_register("", NullDriver),
            Err(StoreError::Configuration(_))
        ));
        assert!(registry.contains("null"));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn register_panics_on_duplicate() {
        let registry = DriverRegistry::new();
        registry.register("null", NullDriver);
        registry.register("null", NullDriver);
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn register_panics_on_empty_name() {
        DriverRegistry::new().register("", NullDriver);
    }

    #[test]
    fn driver_config_defaults_schema_collection() {
        let config: DriverConfig = serde_json::from_value(serde_json::json!({
            "driver_type": "mongodb",
            "connection_string": "mongodb://localhost:27017",
            "database_name": "ninja"
        }))
        .unwrap();

        assert_eq!(config.schema_collection_name, DEFAULT_SCHEMA_COLLECTION);
        assert_eq!(config.driver_type, "mongodb");
    }
}
