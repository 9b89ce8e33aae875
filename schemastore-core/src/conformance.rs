//! Conformance test suite for [`StoreBackend`] implementations.
//!
//! Every backend crate runs the same async checks against a fresh backend instance to
//! prove it honours the storage contract the manager relies on: uniqueness of
//! collection names and item ids, not-found reporting, and faithful round-trips of
//! schemas, metadata and items.
//!
//! # Usage
//!
//! Enable the `testutil` feature and call each function with a fresh backend:
//!
//! ```ignore
//! use schemastore_core::conformance;
//! use schemastore_memory::InMemoryStore;
//!
//! #[tokio::test]
//! async fn duplicate_collection_conflicts() {
//!     conformance::collection_duplicate_name_conflicts(&InMemoryStore::new()).await;
//! }
//! ```
//!
//! # Test Categories
//!
//! | Category | Contract aspect |
//! |----------|-----------------|
//! | Collections | create, list, schema lookup, duplicate names |
//! | Items | insert, get, list, duplicate ids, missing collections |
//! | Concurrent | racing writers never both win |

use futures::future::join_all;
use serde_json::{Map, Value, json};

use crate::{
    backend::StoreBackend,
    collection::{Collection, Metadata, Schema},
    error::StoreError,
    item::{ID_FIELD, Item},
    query::QueryMeta,
};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn people_schema() -> Schema {
    object(json!({
        "type": "object",
        "required": ["firstName"],
        "properties": {
            "firstName": { "type": "string" },
            "age": { "type": "integer", "minimum": 0 }
        }
    }))
}

fn person(id: &str, first_name: &str) -> Item {
    object(json!({ ID_FIELD: id, "firstName": first_name }))
}

async fn create_people<B: StoreBackend>(backend: &B, name: &str) {
    backend
        .create_collection(Collection::new(name, people_schema(), Metadata::new()))
        .await
        .expect("create_collection should succeed");
}

// ============================================================================
// Collections
// ============================================================================

/// A created collection's schema is returned unchanged.
pub async fn collection_create_then_get_schema<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;

    let schema = backend.get_schema("people").await.expect("get_schema");
    assert_eq!(schema, people_schema());
}

/// Metadata survives the round-trip through `get_collections`.
pub async fn collection_metadata_is_preserved<B: StoreBackend>(backend: &B) {
    let metadata = object(json!({ "owner": "registrations", "version": 3 }));
    backend
        .create_collection(Collection::new("forms", people_schema(), metadata.clone()))
        .await
        .expect("create_collection");

    let collections = backend.get_collections().await.expect("get_collections");
    let forms = collections
        .iter()
        .find(|collection| collection.name == "forms")
        .expect("created collection should be listed");

    assert_eq!(forms.metadata, metadata);
    assert_eq!(forms.schema, people_schema());
}

/// Creating the same collection name twice is a conflict and keeps the first schema.
pub async fn collection_duplicate_name_conflicts<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;

    let err = backend
        .create_collection(Collection::builder("people").build())
        .await
        .expect_err("second create should fail");

    assert!(
        matches!(err, StoreError::CollectionAlreadyExists(ref name) if name == "people"),
        "expected CollectionAlreadyExists, got {err:?}"
    );
    assert_eq!(backend.get_schema("people").await.expect("get_schema"), people_schema());
}

/// `get_collections` lists every created collection exactly once.
pub async fn collection_list_contains_all<B: StoreBackend>(backend: &B) {
    for name in ["people", "pets", "places"] {
        create_people(backend, name).await;
    }

    let mut names = backend
        .get_collections()
        .await
        .expect("get_collections")
        .into_iter()
        .map(|collection| collection.name)
        .collect::<Vec<_>>();
    names.sort();

    assert_eq!(names, vec!["people", "pets", "places"]);
}

/// Schema lookup on an unknown collection reports not found.
pub async fn collection_missing_schema_not_found<B: StoreBackend>(backend: &B) {
    let err = backend
        .get_schema("nonexistent")
        .await
        .expect_err("unknown collection");

    assert!(
        matches!(err, StoreError::CollectionNotFound(ref name) if name == "nonexistent"),
        "expected CollectionNotFound, got {err:?}"
    );
}

// ============================================================================
// Items
// ============================================================================

/// An inserted item is returned unchanged, `_id` included.
pub async fn item_insert_then_get<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;
    let ada = object(json!({
        ID_FIELD: "ada",
        "firstName": "Ada",
        "age": 36,
        "tags": ["math", "engines"],
        "address": { "city": "London" }
    }));

    backend
        .insert_item("people", "ada", ada.clone())
        .await
        .expect("insert_item");

    assert_eq!(backend.get_item("people", "ada").await.expect("get_item"), ada);
}

/// A second insert under an existing id is a conflict and leaves the first item intact.
pub async fn item_duplicate_id_conflicts<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;
    backend
        .insert_item("people", "ada", person("ada", "Ada"))
        .await
        .expect("first insert");

    let err = backend
        .insert_item("people", "ada", person("ada", "Augusta"))
        .await
        .expect_err("second insert should fail");

    assert!(err.is_conflict(), "expected a conflict, got {err:?}");
    assert_eq!(
        backend.get_item("people", "ada").await.expect("get_item")["firstName"],
        "Ada"
    );
}

/// The same id may be used in different collections.
pub async fn item_ids_are_scoped_to_collection<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;
    create_people(backend, "staff").await;

    backend
        .insert_item("people", "ada", person("ada", "Ada"))
        .await
        .expect("insert into people");
    backend
        .insert_item("staff", "ada", person("ada", "Augusta"))
        .await
        .expect("insert into staff");

    assert_eq!(
        backend.get_item("staff", "ada").await.expect("get_item")["firstName"],
        "Augusta"
    );
}

/// Reading a missing item reports not found.
pub async fn item_missing_not_found<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;

    let err = backend
        .get_item("people", "ghost")
        .await
        .expect_err("missing item");

    assert!(err.is_not_found(), "expected not found, got {err:?}");
}

/// Item operations on an unknown collection report not found.
pub async fn item_unknown_collection_not_found<B: StoreBackend>(backend: &B) {
    let err = backend
        .get_item("nonexistent", "ada")
        .await
        .expect_err("unknown collection");
    assert!(err.is_not_found(), "get_item: expected not found, got {err:?}");

    let err = backend
        .get_items("nonexistent", &QueryMeta::default())
        .await
        .expect_err("unknown collection");
    assert!(err.is_not_found(), "get_items: expected not found, got {err:?}");
}

/// `get_items` returns every item of the collection and nothing from other collections.
pub async fn item_list_returns_all<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;
    create_people(backend, "staff").await;
    for (id, name) in [("ada", "Ada"), ("grace", "Grace"), ("alan", "Alan")] {
        backend
            .insert_item("people", id, person(id, name))
            .await
            .expect("insert_item");
    }
    backend
        .insert_item("staff", "linus", person("linus", "Linus"))
        .await
        .expect("insert_item");

    let (items, _info) = backend
        .get_items("people", &QueryMeta::default())
        .await
        .expect("get_items");
    let mut ids = items
        .iter()
        .filter_map(|item| item.get(ID_FIELD).and_then(Value::as_str))
        .collect::<Vec<_>>();
    ids.sort_unstable();

    assert_eq!(ids, vec!["ada", "alan", "grace"]);
}

/// Paging parameters never cause items to be dropped.
pub async fn item_list_ignores_paging<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;
    for n in 0..5 {
        let id = format!("p{n}");
        backend
            .insert_item("people", &id, person(&id, "Anon"))
            .await
            .expect("insert_item");
    }

    let query = QueryMeta::builder().with_page(2).with_count(2).build();
    let (items, _info) = backend.get_items("people", &query).await.expect("get_items");

    assert_eq!(items.len(), 5);
}

/// Listing an empty collection succeeds with no items.
pub async fn item_list_empty_collection<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;

    let (items, _info) = backend
        .get_items("people", &QueryMeta::default())
        .await
        .expect("get_items");

    assert!(items.is_empty());
}

// ============================================================================
// Concurrent
// ============================================================================

/// Of several concurrent inserts under one id, exactly one wins.
pub async fn concurrent_duplicate_inserts_single_winner<B: StoreBackend>(backend: &B) {
    create_people(backend, "people").await;

    let attempts = (0..8).map(|n| {
        let item = person("shared", &format!("writer-{n}"));
        async move { backend.insert_item("people", "shared", item).await }
    });
    let results = join_all(attempts).await;

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1, "exactly one insert should succeed: {results:?}");
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(StoreError::is_conflict),
        "losers should see a conflict: {results:?}"
    );
}

/// Of several concurrent creates of one collection, exactly one wins.
pub async fn concurrent_duplicate_collections_single_winner<B: StoreBackend>(backend: &B) {
    let attempts = (0..8).map(|_| async move {
        backend
            .create_collection(Collection::new("people", people_schema(), Metadata::new()))
            .await
    });
    let results = join_all(attempts).await;

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1, "exactly one create should succeed: {results:?}");
}

/// Runs every check in this module, each against a fresh backend from `make`.
pub async fn run_all<B, F, Fut>(make: F)
where
    B: StoreBackend,
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = B>,
{
    collection_create_then_get_schema(&make().await).await;
    collection_metadata_is_preserved(&make().await).await;
    collection_duplicate_name_conflicts(&make().await).await;
    collection_list_contains_all(&make().await).await;
    collection_missing_schema_not_found(&make().await).await;
    item_insert_then_get(&make().await).await;
    item_duplicate_id_conflicts(&make().await).await;
    item_ids_are_scoped_to_collection(&make().await).await;
    item_missing_not_found(&make().await).await;
    item_unknown_collection_not_found(&make().await).await;
    item_list_returns_all(&make().await).await;
    item_list_ignores_paging(&make().await).await;
    item_list_empty_collection(&make().await).await;
    concurrent_duplicate_inserts_single_winner(&make().await).await;
    concurrent_duplicate_collections_single_winner(&make().await).await;
}
