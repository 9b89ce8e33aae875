//! Error types and result types for schema store operations.
//!
//! This module provides error handling for the manager, the driver registry and every
//! storage backend. Use [`StoreResult<T>`] as the return type for fallible operations.
//!
//! Errors fall into a handful of categories:
//!
//! - configuration errors ([`StoreError::Configuration`], [`StoreError::DriverNotFound`],
//!   [`StoreError::Initialization`]), which are fatal at startup
//! - not-found errors ([`StoreError::CollectionNotFound`], [`StoreError::ItemNotFound`])
//! - conflicts ([`StoreError::CollectionAlreadyExists`], [`StoreError::ItemAlreadyExists`])
//! - rejected input ([`StoreError::SchemaCompile`], [`StoreError::Validation`], ...)
//! - opaque backend faults ([`StoreError::Backend`])

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Represents all possible errors that can occur when interacting with a schema store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store was wired up incorrectly, e.g. a manager was built without a backend.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// No driver is registered under the requested name.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
    /// Error during backend initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The requested collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// A collection with the given name already exists.
    #[error("Collection already exists: {0}")]
    CollectionAlreadyExists(String),
    /// The collection name cannot be used.
    #[error("Invalid collection name: {0:?}")]
    InvalidCollectionName(String),
    /// The requested item was not found.
    /// The first argument is the item ID, the second is the collection name.
    #[error("Item {0} not found in collection {1}")]
    ItemNotFound(String, String),
    /// An item with the given ID already exists.
    /// The first argument is the item ID, the second is the collection name.
    #[error("Item {0} already exists in collection {1}")]
    ItemAlreadyExists(String, String),
    /// The supplied schema is not a valid JSON Schema document.
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    /// The item violates one or more rules of its collection's schema.
    #[error("Validation failed:\n{0}")]
    Validation(ValidationErrors),
    /// The payload has an invalid structure (not an object, bad field types).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error during {operation} on {collection:?}: {message}")]
    Backend {
        /// The backend operation that failed, e.g. `insert_item`.
        operation: &'static str,
        /// The collection the operation targeted.
        collection: String,
        /// The backend's own description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Builds a [`StoreError::Backend`] carrying the failing operation and collection.
    pub fn backend(
        operation: &'static str,
        collection: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        StoreError::Backend {
            operation,
            collection: collection.into(),
            message: message.to_string(),
        }
    }

    /// Returns `true` for errors that mean "the thing you asked for does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CollectionNotFound(_) | StoreError::ItemNotFound(..)
        )
    }

    /// Returns `true` for uniqueness violations.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::CollectionAlreadyExists(_) | StoreError::ItemAlreadyExists(..)
        )
    }

    /// Returns `true` for errors that only occur while wiring up the store.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::Configuration(_)
                | StoreError::DriverNotFound(_)
                | StoreError::Initialization(_)
        )
    }

    /// Returns the violation list when this is a [`StoreError::Validation`].
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            StoreError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A specialized `Result` type for schema store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_not_found_and_conflicts() {
        assert!(StoreError::CollectionNotFound("people".into()).is_not_found());
        assert!(StoreError::ItemNotFound("1".into(), "people".into()).is_not_found());
        assert!(!StoreError::CollectionNotFound("people".into()).is_conflict());

        assert!(StoreError::CollectionAlreadyExists("people".into()).is_conflict());
        assert!(StoreError::ItemAlreadyExists("1".into(), "people".into()).is_conflict());

        assert!(StoreError::DriverNotFound("nope".into()).is_configuration());
        assert!(!StoreError::SchemaCompile("bad".into()).is_configuration());
    }

    #[test]
    fn backend_error_carries_context() {
        let err = StoreError::backend("insert_item", "people", "connection reset");

        assert_eq!(
            err.to_string(),
            "Backend error during insert_item on \"people\": connection reset"
        );
    }
}
