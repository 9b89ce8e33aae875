//! Convenient re-exports of commonly used types from schemastore.
//!
//! ```ignore
//! use schemastore::prelude::*;
//! ```

pub use schemastore_core::{
    backend::{DynStoreBackend, StoreBackend, StoreBackendBuilder},
    collection::{Collection, CollectionBuilder, Metadata, Schema},
    error::{StoreError, StoreResult},
    item::{ID_FIELD, Item},
    manager::{Manager, ManagerBuilder},
    query::{ItemsResponseInfo, QueryMeta},
    registry::{Driver, DriverConfig, DriverRegistry},
    validation::{CompiledSchema, ValidationErrors, ValidationIssue},
};
