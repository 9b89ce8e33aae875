//! Runs the backend conformance suite against a live MongoDB server.
//!
//! Set `SCHEMASTORE_TEST_MONGODB_URI` (for example `mongodb://localhost:27017`) to run
//! these tests. Without it every test returns early. Each test uses its own database,
//! which is dropped afterwards.

use std::sync::atomic::{AtomicUsize, Ordering};

use mongodb::Client;
use schemastore_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::Collection,
    conformance,
    error::StoreError,
};
use schemastore_mongodb::MongoDbStore;

const URI_VAR: &str = "SCHEMASTORE_TEST_MONGODB_URI";

static DATABASE_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn database_name() -> String {
    format!(
        "schemastore_test_{}_{}",
        std::process::id(),
        DATABASE_COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

async fn drop_database(uri: &str, database: &str) {
    if let Ok(client) = Client::with_uri_str(uri).await {
        let _ = client.database(database).drop().await;
    }
}

macro_rules! conformance_tests {
    ($($name:ident),* $(,)?) => {
        $(
            #[tokio::test]
            async fn $name() {
                let Ok(uri) = std::env::var(URI_VAR) else {
                    eprintln!("skipping: {URI_VAR} not set");
                    return;
                };
                let database = database_name();
                let store = MongoDbStore::builder(&uri, &database)
                    .build()
                    .await
                    .expect("connect to mongodb");

                conformance::$name(&store).await;

                drop_database(&uri, &database).await;
            }
        )*
    };
}

conformance_tests!(
    collection_create_then_get_schema,
    collection_metadata_is_preserved,
    collection_duplicate_name_conflicts,
    collection_list_contains_all,
    collection_missing_schema_not_found,
    item_insert_then_get,
    item_duplicate_id_conflicts,
    item_ids_are_scoped_to_collection,
    item_missing_not_found,
    item_unknown_collection_not_found,
    item_list_returns_all,
    item_list_ignores_paging,
    item_list_empty_collection,
    concurrent_duplicate_inserts_single_winner,
    concurrent_duplicate_collections_single_winner,
);

#[tokio::test]
async fn schema_collection_name_is_reserved() {
    let Ok(uri) = std::env::var(URI_VAR) else {
        eprintln!("skipping: {URI_VAR} not set");
        return;
    };
    let database = database_name();
    let store = MongoDbStore::builder(&uri, &database)
        .with_schema_collection("_records")
        .build()
        .await
        .expect("connect to mongodb");

    let err = store
        .create_collection(Collection::builder("_records").build())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidCollectionName(_)));

    drop_database(&uri, &database).await;
}
