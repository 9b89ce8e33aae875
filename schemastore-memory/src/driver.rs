//! Registry driver for the in-memory backend.

use async_trait::async_trait;
use tracing::debug;

use schemastore_core::{
    backend::DynStoreBackend,
    error::StoreResult,
    registry::{Driver, DriverConfig, DriverRegistry},
};

use crate::store::InMemoryStore;

/// Name the in-memory driver is registered under.
pub const DRIVER_NAME: &str = "memory";

/// Connects to a fresh, empty [`InMemoryStore`]. Connection settings are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryDriver;

#[async_trait]
impl Driver for InMemoryDriver {
    async fn connect(&self, config: &DriverConfig) -> StoreResult<DynStoreBackend> {
        if !config.connection_string.is_empty() {
            debug!("in-memory driver ignores its connection string");
        }

        Ok(Box::new(InMemoryStore::new()))
    }
}

/// Registers [`InMemoryDriver`] under [`DRIVER_NAME`].
///
/// # Panics
///
/// Panics if a driver is already registered under that name.
pub fn register(registry: &DriverRegistry) {
    registry.register(DRIVER_NAME, InMemoryDriver);
}
