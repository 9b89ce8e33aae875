//! Collection records.
//!
//! A collection is a named, schema-governed bucket of items. The record kept by a
//! backend holds the collection's name, its JSON Schema and an opaque metadata object.
//!
//! # Example
//!
//! ```ignore
//! use schemastore_core::collection::Collection;
//! use serde_json::json;
//!
//! let people = Collection::builder("people")
//!     .with_schema(json!({
//!         "type": "object",
//!         "required": ["firstName"],
//!         "properties": { "firstName": { "type": "string" } }
//!     }).as_object().cloned().unwrap())
//!     .build();
//!
//! assert_eq!(people.name, "people");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON Schema document, kept as a JSON object.
pub type Schema = Map<String, Value>;

/// Opaque collection metadata. Persisted but not interpreted.
pub type Metadata = Map<String, Value>;

/// The stored record describing a collection.
///
/// On the wire the metadata is exposed under the `meta` key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Collection {
    /// Unique, immutable collection name.
    pub name: String,
    /// The JSON Schema every item in this collection must satisfy.
    #[serde(default)]
    pub schema: Schema,
    /// Free-form metadata supplied at creation time.
    #[serde(rename = "meta", default)]
    pub metadata: Metadata,
}

impl Collection {
    /// Creates a collection record from its parts.
    pub fn new(name: impl Into<String>, schema: Schema, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            schema,
            metadata,
        }
    }

    /// Creates a new builder for a collection with the given name.
    pub fn builder(name: impl Into<String>) -> CollectionBuilder {
        CollectionBuilder::new(name)
    }
}

/// Builder for constructing [`Collection`] records with a fluent API.
pub struct CollectionBuilder {
    name: String,
    schema: Schema,
    metadata: Metadata,
}

impl CollectionBuilder {
    /// Creates a new builder with an empty schema and no metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Schema::new(),
            metadata: Metadata::new(),
        }
    }

    /// Sets the collection's schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the collection's metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Builds and returns the final [`Collection`].
    pub fn build(self) -> Collection {
        Collection {
            name: self.name,
            schema: self.schema,
            metadata: self.metadata,
        }
    }
}
