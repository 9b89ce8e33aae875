//! End-to-end manager behaviour over the in-memory backend.

use std::collections::HashSet;

use schemastore_core::{
    collection::{Metadata, Schema},
    error::StoreError,
    manager::Manager,
    query::QueryMeta,
    registry::{DriverConfig, DriverRegistry},
};
use serde_json::{Value, json};

fn object(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn people_schema() -> Schema {
    object(json!({
        "type": "object",
        "required": ["firstName"],
        "properties": {
            "firstName": { "type": "string" },
            "lastName": { "type": "string" },
            "age": { "type": "integer", "minimum": 0 }
        }
    }))
}

async fn manager() -> Manager {
    let registry = DriverRegistry::new();
    schemastore_memory::register(&registry);

    let backend = registry
        .connect("memory", &DriverConfig::new("memory"))
        .await
        .unwrap();

    Manager::builder().with_backend(backend).build().unwrap()
}

#[tokio::test]
async fn save_and_read_back_item() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), Metadata::new())
        .await
        .unwrap();

    let id = manager
        .save_item("people", object(json!({ "firstName": "Ada", "age": 36 })))
        .await
        .unwrap();
    let item = manager.get_item("people", &id).await.unwrap();

    assert!(!id.is_empty());
    assert_eq!(item["_id"], Value::String(id));
    assert_eq!(item["firstName"], "Ada");
    assert_eq!(item["age"], 36);
}

#[tokio::test]
async fn invalid_item_is_rejected_and_not_stored() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), Metadata::new())
        .await
        .unwrap();

    let err = manager
        .save_item("people", object(json!({ "lastName": "Hopper", "age": -1 })))
        .await
        .unwrap_err();

    let mut keywords = err
        .validation_errors()
        .unwrap()
        .iter()
        .map(|issue| issue.keyword.clone())
        .collect::<Vec<_>>();
    keywords.sort();
    assert_eq!(keywords, vec!["minimum", "required"]);

    let (items, _) = manager
        .get_items("people", &QueryMeta::default())
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn schema_round_trips() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), Metadata::new())
        .await
        .unwrap();

    assert_eq!(manager.get_schema("people").await.unwrap(), people_schema());
    assert!(manager.get_schema("nonexistent").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn generated_ids_are_unique() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), Metadata::new())
        .await
        .unwrap();

    let mut ids = HashSet::new();
    for n in 0..50 {
        let id = manager
            .save_item("people", object(json!({ "firstName": format!("person-{n}") })))
            .await
            .unwrap();
        ids.insert(id);
    }

    assert_eq!(ids.len(), 50);
}

#[tokio::test]
async fn caller_supplied_id_is_kept_once() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), Metadata::new())
        .await
        .unwrap();

    let id = manager
        .save_item("people", object(json!({ "_id": "ada", "firstName": "Ada" })))
        .await
        .unwrap();
    let err = manager
        .save_item("people", object(json!({ "_id": "ada", "firstName": "Augusta" })))
        .await
        .unwrap_err();

    assert_eq!(id, "ada");
    assert!(matches!(err, StoreError::ItemAlreadyExists(ref id, ref coll) if id == "ada" && coll == "people"));
    assert_eq!(manager.get_item("people", "ada").await.unwrap()["firstName"], "Ada");
}

#[tokio::test]
async fn non_string_id_is_replaced() {
    let manager = manager().await;
    manager
        .create_collection("people", Schema::new(), Metadata::new())
        .await
        .unwrap();

    let id = manager
        .save_item("people", object(json!({ "_id": 42, "firstName": "Ada" })))
        .await
        .unwrap();

    assert_ne!(id, "42");
    assert_eq!(manager.get_item("people", &id).await.unwrap()["_id"], Value::String(id));
}

#[tokio::test]
async fn duplicate_collection_conflicts() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), Metadata::new())
        .await
        .unwrap();

    let err = manager
        .create_collection("people", Schema::new(), Metadata::new())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::CollectionAlreadyExists(_)));
    assert_eq!(manager.get_collections().await.unwrap().len(), 1);
}

#[tokio::test]
async fn listing_returns_every_saved_item() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), object(json!({ "label": "People" })))
        .await
        .unwrap();
    for name in ["Ada", "Grace", "Alan"] {
        manager
            .save_item("people", object(json!({ "firstName": name })))
            .await
            .unwrap();
    }

    let query = QueryMeta::builder().with_page(1).with_count(1).build();
    let (items, _) = manager.get_items("people", &query).await.unwrap();
    let mut names = items
        .iter()
        .map(|item| item["firstName"].as_str().unwrap())
        .collect::<Vec<_>>();
    names.sort_unstable();

    assert_eq!(names, vec!["Ada", "Alan", "Grace"]);
    assert_eq!(
        manager.get_collections().await.unwrap()[0].metadata["label"],
        "People"
    );
}

#[tokio::test]
async fn missing_item_is_not_found() {
    let manager = manager().await;
    manager
        .create_collection("people", people_schema(), Metadata::new())
        .await
        .unwrap();

    let err = manager.get_item("people", "nobody").await.unwrap_err();

    assert!(matches!(err, StoreError::ItemNotFound(..)));
}

#[tokio::test]
async fn shutdown_consumes_manager() {
    let manager = manager().await;

    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn string_formats_are_enforced() {
    let manager = manager().await;
    manager
        .create_collection(
            "contacts",
            object(json!({
                "type": "object",
                "properties": {
                    "email": { "type": "string", "format": "email" },
                    "born": { "type": "string", "format": "date-time" }
                }
            })),
            Metadata::new(),
        )
        .await
        .unwrap();

    let err = manager
        .save_item("contacts", object(json!({ "email": "not-an-email", "born": "yesterday" })))
        .await
        .unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|issue| issue.keyword == "format"));

    let (items, _) = manager
        .get_items("contacts", &QueryMeta::default())
        .await
        .unwrap();
    assert!(items.is_empty());

    manager
        .save_item(
            "contacts",
            object(json!({ "email": "ada@example.com", "born": "1815-12-10T00:00:00Z" })),
        )
        .await
        .unwrap();
}
