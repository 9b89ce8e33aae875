//! Listing parameters and response metadata for item queries.
//!
//! Only "list all items" is supported. [`QueryMeta`] and [`ItemsResponseInfo`] reserve
//! the shape of a future pagination/filter contract; backends are free to ignore the
//! request fields and return the whole collection, and the response metadata is
//! always empty.

use serde::{Deserialize, Serialize};

/// Paging and filter parameters for [`get_items`](crate::manager::Manager::get_items).
///
/// # Example
///
/// ```ignore
/// use schemastore_core::query::QueryMeta;
///
/// let query = QueryMeta::builder().with_page(2).with_count(50).build();
/// assert_eq!(query.page, 2);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryMeta {
    /// The requested page number.
    #[serde(default)]
    pub page: u64,
    /// Number of items per page.
    #[serde(default)]
    pub count: u64,
    /// Free-form query expression.
    #[serde(default, rename = "query")]
    pub query_string: String,
}

impl QueryMeta {
    /// Creates a new builder with all fields unset.
    pub fn builder() -> QueryMetaBuilder {
        QueryMetaBuilder::default()
    }
}

/// Builder for constructing [`QueryMeta`] instances.
#[derive(Default)]
pub struct QueryMetaBuilder {
    page: u64,
    count: u64,
    query_string: String,
}

impl QueryMetaBuilder {
    /// Sets the page number.
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Sets the number of items per page.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Sets the query expression.
    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    /// Builds and returns the [`QueryMeta`].
    pub fn build(self) -> QueryMeta {
        QueryMeta {
            page: self.page,
            count: self.count,
            query_string: self.query_string,
        }
    }
}

/// Metadata returned alongside a list of items. Currently carries no fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct ItemsResponseInfo {}

impl ItemsResponseInfo {
    pub fn new() -> Self {
        Self {}
    }
}
