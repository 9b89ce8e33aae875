//! Core of the schemastore project: a schema-validated JSON document store.
//!
//! Collections are named sets of JSON items, each governed by a JSON Schema fixed at
//! creation time. Every item is validated against that schema before it is persisted.
//! Persistence itself is pluggable: backends implement one trait and are selected at
//! runtime by driver name.
//!
//! This crate provides:
//!
//! - **Manager** ([`manager`]) - The validating entry point applications talk to
//! - **Store backend abstraction** ([`backend`]) - The contract every storage backend implements
//! - **Driver registry** ([`registry`]) - Name based lookup from configuration to backend
//! - **Validation** ([`validation`]) - Schema compilation and structured validation errors
//! - **Collections and items** ([`collection`], [`item`]) - The stored data model
//! - **Listing parameters** ([`query`]) - Paging placeholders for item listings
//! - **Error handling** ([`error`]) - The error taxonomy shared by every crate
//!
//! # Example
//!
//! ```ignore
//! use schemastore_core::{manager::Manager, registry::{DriverConfig, DriverRegistry}};
//!
//! let registry = DriverRegistry::new();
//! schemastore_memory::register(&registry);
//!
//! let backend = registry.connect("memory", &DriverConfig::new("memory")).await?;
//! let manager = Manager::builder().with_backend(backend).build()?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as schemastore_core;

pub mod backend;
pub mod collection;
pub mod error;
pub mod item;
pub mod manager;
pub mod query;
pub mod registry;
pub mod validation;

#[cfg(feature = "testutil")]
pub mod conformance;
