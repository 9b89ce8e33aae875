//! MongoDB backend implementation for schemastore.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//! Collection records live in a dedicated schema collection keyed by collection name,
//! and every schemastore collection maps to a MongoDB collection of the same name.
//! Uniqueness of collection names and item ids rests on MongoDB's `_id` index.
//!
//! To use this backend through the facade crate, enable its `mongodb` feature:
//!
//! ```toml
//! [dependencies]
//! schemastore = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use schemastore_core::backend::StoreBackendBuilder;
//! use schemastore_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "ninja")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as schemastore_mongodb;

pub mod driver;
pub mod sanitizer;
pub mod store;

pub use driver::{DRIVER_NAME, MongoDbDriver, register};
pub use store::{MongoDbStore, MongoDbStoreBuilder};
