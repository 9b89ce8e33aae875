//! Registry driver for the MongoDB backend.

use async_trait::async_trait;

use schemastore_core::{
    backend::{DynStoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
    registry::{Driver, DriverConfig, DriverRegistry},
};

use crate::store::MongoDbStoreBuilder;

/// Name the MongoDB driver is registered under.
pub const DRIVER_NAME: &str = "mongodb";

/// Connects to MongoDB using `connection_string`, `database_name` and
/// `schema_collection_name` from the [`DriverConfig`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoDbDriver;

#[async_trait]
impl Driver for MongoDbDriver {
    async fn connect(&self, config: &DriverConfig) -> StoreResult<DynStoreBackend> {
        if config.connection_string.is_empty() {
            return Err(StoreError::Configuration(
                "mongodb driver requires a connection_string".to_string(),
            ));
        }

        let store = MongoDbStoreBuilder::new(&config.connection_string, &config.database_name)
            .with_schema_collection(&config.schema_collection_name)
            .build()
            .await?;

        Ok(Box::new(store))
    }
}

/// Registers [`MongoDbDriver`] under [`DRIVER_NAME`].
///
/// # Panics
///
/// Panics if a driver is already registered under that name.
pub fn register(registry: &DriverRegistry) {
    registry.register(DRIVER_NAME, MongoDbDriver);
}
