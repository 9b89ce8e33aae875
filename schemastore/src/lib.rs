//! Main schemastore crate: a schema-validated JSON document store.
//!
//! This crate is the entry point for users of schemastore. It re-exports the core
//! types from the sub-crates, bundles the storage drivers, and provides the YAML
//! configuration layer and REST transport used by the `schemastore` binary.
//!
//! # Quick Start
//!
//! ```ignore
//! use schemastore::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = schemastore::registry();
//!     let backend = registry.connect("memory", &DriverConfig::new("memory")).await?;
//!     let manager = Manager::builder().with_backend(backend).build()?;
//!
//!     let schema = json!({
//!         "type": "object",
//!         "required": ["firstName"],
//!         "properties": { "firstName": { "type": "string" } }
//!     });
//!     manager
//!         .create_collection("people", schema.as_object().cloned().unwrap(), Metadata::new())
//!         .await?;
//!
//!     let id = manager
//!         .save_item("people", json!({ "firstName": "Ada" }).as_object().cloned().unwrap())
//!         .await?;
//!     println!("saved {id}: {:?}", manager.get_item("people", &id).await?);
//!
//!     manager.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod config;
pub mod prelude;
pub mod rest;

pub use schemastore_core::{
    backend, collection, error, item, manager, query, registry, validation,
};

/// In-memory storage backend implementations.
pub mod memory {
    pub use schemastore_memory::{DRIVER_NAME, InMemoryDriver, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use schemastore_mongodb::{DRIVER_NAME, MongoDbDriver, MongoDbStore, MongoDbStoreBuilder};
}

use schemastore_core::registry::DriverRegistry;

/// Builds a [`DriverRegistry`] with every driver compiled into this build registered.
pub fn registry() -> DriverRegistry {
    let registry = DriverRegistry::new();

    schemastore_memory::register(&registry);
    #[cfg(feature = "mongodb")]
    schemastore_mongodb::register(&registry);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_includes_compiled_drivers() {
        let registry = registry();

        assert!(registry.contains(memory::DRIVER_NAME));
        assert_eq!(registry.contains("mongodb"), cfg!(feature = "mongodb"));
    }
}
