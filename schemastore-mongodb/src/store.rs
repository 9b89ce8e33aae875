//! MongoDB storage implementation.

use async_trait::async_trait;
use bson::{Bson, Document, de::deserialize_from_bson, doc, ser::serialize_to_bson};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::ClientOptions,
};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use schemastore_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::{Collection, Schema},
    error::{StoreError, StoreResult},
    item::{ID_FIELD, Item},
    query::{ItemsResponseInfo, QueryMeta},
    registry::DEFAULT_SCHEMA_COLLECTION,
};

use crate::sanitizer::ValueSanitizer;

const DUPLICATE_KEY: i32 = 11000;

const SCHEMA_FIELD: &str = "schema";
const METADATA_FIELD: &str = "meta";

/// MongoDB storage backend.
///
/// Collection records are stored in the schema collection as
/// `{ _id: <name>, schema: <schema>, meta: <metadata> }`. Items are stored in a MongoDB
/// collection named after their schemastore collection, with `_id` set to the item id.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
    schema_collection: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String, schema_collection: String) -> Self {
        Self {
            client,
            database,
            schema_collection,
        }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    /// Name of the collection holding collection records.
    pub fn schema_collection(&self) -> &str {
        &self.schema_collection
    }

    fn schemas(&self) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&self.schema_collection)
    }

    fn items(&self, collection: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection)
    }

    async fn find_record(&self, collection: &str) -> StoreResult<Option<Document>> {
        self.schemas()
            .find_one(doc! { "_id": collection })
            .await
            .map_err(|e| StoreError::backend("get_schema", collection, e))
    }

    async fn require_collection(&self, operation: &'static str, collection: &str) -> StoreResult<()> {
        let found = self
            .schemas()
            .find_one(doc! { "_id": collection })
            .projection(doc! { "_id": 1 })
            .await
            .map_err(|e| StoreError::backend(operation, collection, e))?;

        match found {
            Some(_) => Ok(()),
            None => Err(StoreError::CollectionNotFound(collection.to_string())),
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

/// The operation and collection a conversion runs for, attached to its errors.
#[derive(Debug, Clone, Copy)]
struct Context<'a> {
    operation: &'static str,
    collection: &'a str,
}

impl<'a> Context<'a> {
    fn new(operation: &'static str, collection: &'a str) -> Self {
        Self {
            operation,
            collection,
        }
    }

    fn fault(self, message: impl ToString) -> StoreError {
        StoreError::backend(self.operation, self.collection, message)
    }
}

/// Converts a JSON object into a BSON document with escaped keys.
fn to_document(cx: Context<'_>, object: &Map<String, Value>) -> StoreResult<Document> {
    match serialize_to_bson(object).map_err(|e| cx.fault(e))? {
        Bson::Document(doc) => Ok(ValueSanitizer::sanitize_document(doc)),
        other => Err(cx.fault(format!(
            "expected a document, got {:?}",
            other.element_type()
        ))),
    }
}

/// Converts a stored BSON value back into a JSON object, unescaping keys.
fn to_object(cx: Context<'_>, value: Bson) -> StoreResult<Map<String, Value>> {
    match deserialize_from_bson::<Value>(ValueSanitizer::restore_value(value))
        .map_err(|e| cx.fault(e))?
    {
        Value::Object(map) => Ok(map),
        other => Err(cx.fault(format!("expected an object, got {other}"))),
    }
}

/// Restores an item, keeping `_id` exactly as stored.
fn restore_item(cx: Context<'_>, mut document: Document) -> StoreResult<Item> {
    let id = document.remove(ID_FIELD);
    let mut item = to_object(cx, Bson::Document(document))?;

    if let Some(id) = id {
        let id = deserialize_from_bson::<Value>(id).map_err(|e| cx.fault(e))?;
        item.insert(ID_FIELD.to_string(), id);
    }

    Ok(item)
}

fn restore_collection(cx: Context<'_>, mut record: Document) -> StoreResult<Collection> {
    let name = match record.remove("_id") {
        Some(Bson::String(name)) => name,
        other => {
            return Err(cx.fault(format!(
                "collection record has a non-string _id: {other:?}"
            )));
        }
    };
    let schema = record
        .remove(SCHEMA_FIELD)
        .map(|value| to_object(cx, value))
        .transpose()?
        .unwrap_or_default();
    let metadata = record
        .remove(METADATA_FIELD)
        .map(|value| to_object(cx, value))
        .transpose()?
        .unwrap_or_default();

    Ok(Collection::new(name, schema, metadata))
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    #[instrument(skip_all, fields(collection = %collection.name))]
    async fn create_collection(&self, collection: Collection) -> StoreResult<()> {
        if collection.name == self.schema_collection || collection.name.contains(['$', '\0']) {
            return Err(StoreError::InvalidCollectionName(collection.name));
        }

        let cx = Context::new("create_collection", &collection.name);
        let record = doc! {
            "_id": collection.name.as_str(),
            SCHEMA_FIELD: to_document(cx, &collection.schema)?,
            METADATA_FIELD: to_document(cx, &collection.metadata)?,
        };

        match self.schemas().insert_one(record).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(StoreError::CollectionAlreadyExists(collection.name))
            }
            Err(e) => Err(StoreError::backend("create_collection", &collection.name, e)),
        }
    }

    #[instrument(skip_all)]
    async fn get_collections(&self) -> StoreResult<Vec<Collection>> {
        let cx = Context::new("get_collections", &self.schema_collection);

        self.schemas()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|e| StoreError::backend("get_collections", &self.schema_collection, e))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::backend("get_collections", &self.schema_collection, e))?
            .into_iter()
            .map(|record| restore_collection(cx, record))
            .collect()
    }

    #[instrument(skip_all, fields(collection = %collection))]
    async fn get_schema(&self, collection: &str) -> StoreResult<Schema> {
        let record = self
            .find_record(collection)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        Ok(restore_collection(Context::new("get_schema", collection), record)?.schema)
    }

    #[instrument(skip_all, fields(collection = %collection, item = %id))]
    async fn insert_item(&self, collection: &str, id: &str, item: Item) -> StoreResult<()> {
        self.require_collection("insert_item", collection).await?;

        let mut document = to_document(Context::new("insert_item", collection), &item)?;
        document.insert(ID_FIELD, id);

        match self.items(collection).insert_one(document).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::ItemAlreadyExists(
                id.to_string(),
                collection.to_string(),
            )),
            Err(e) => Err(StoreError::backend("insert_item", collection, e)),
        }
    }

    #[instrument(skip_all, fields(collection = %collection, item = %id))]
    async fn get_item(&self, collection: &str, id: &str) -> StoreResult<Item> {
        self.require_collection("get_item", collection).await?;

        let document = self
            .items(collection)
            .find_one(doc! { ID_FIELD: id })
            .await
            .map_err(|e| StoreError::backend("get_item", collection, e))?
            .ok_or_else(|| StoreError::ItemNotFound(id.to_string(), collection.to_string()))?;

        restore_item(Context::new("get_item", collection), document)
    }

    #[instrument(skip_all, fields(collection = %collection))]
    async fn get_items(
        &self,
        collection: &str,
        _query: &QueryMeta,
    ) -> StoreResult<(Vec<Item>, ItemsResponseInfo)> {
        self.require_collection("get_items", collection).await?;

        let cx = Context::new("get_items", collection);
        let items = self
            .items(collection)
            .find(doc! {})
            .sort(doc! { ID_FIELD: 1 })
            .await
            .map_err(|e| StoreError::backend("get_items", collection, e))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::backend("get_items", collection, e))?
            .into_iter()
            .map(|document| restore_item(cx, document))
            .collect::<StoreResult<Vec<Item>>>()?;

        Ok((items, ItemsResponseInfo::new()))
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        debug!(database = %self.database, "closed mongodb client");

        Ok(())
    }
}

/// Builder for [`MongoDbStore`]. Building connects and pings the server, so a bad
/// connection string or an unreachable server fails here rather than on first use.
#[derive(Debug)]
pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
    schema_collection: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            schema_collection: DEFAULT_SCHEMA_COLLECTION.to_string(),
        }
    }

    /// Overrides the name of the collection holding collection records.
    pub fn with_schema_collection(mut self, name: &str) -> Self {
        self.schema_collection = name.to_string();
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        if self.database.is_empty() {
            return Err(StoreError::Configuration(
                "mongodb database name must not be empty".to_string(),
            ));
        }

        let client = Client::with_options(
            ClientOptions::parse(&self.dsn)
                .await
                .map_err(|e| StoreError::Initialization(e.to_string()))?,
        )
        .map_err(|e| StoreError::Initialization(e.to_string()))?;

        client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Initialization(format!("ping failed: {e}")))?;

        Ok(MongoDbStore::new(client, self.database, self.schema_collection))
    }
}
