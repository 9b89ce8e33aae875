//! In-memory storage backend for schemastore.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend`
//! trait. It uses an async-aware read-write lock for concurrent access and is meant for
//! development, tests and single-process deployments. Nothing survives a restart.
//!
//! # Quick Start
//!
//! ```ignore
//! use schemastore_core::{manager::Manager, registry::{DriverConfig, DriverRegistry}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = DriverRegistry::new();
//!     schemastore_memory::register(&registry);
//!
//!     let backend = registry.connect("memory", &DriverConfig::new("memory")).await?;
//!     let manager = Manager::builder().with_backend(backend).build()?;
//!
//!     manager.create_collection("people", Default::default(), Default::default()).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as schemastore_memory;

pub mod driver;
pub mod store;

pub use driver::{DRIVER_NAME, InMemoryDriver, register};
pub use store::{InMemoryStore, InMemoryStoreBuilder};
