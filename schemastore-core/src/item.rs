//! Items and item identity.
//!
//! An item is an arbitrary JSON object stored in a collection. Its identity lives in
//! the `_id` field, which is either supplied by the caller as a non-empty string or
//! generated as a 24 character hex ObjectId. ObjectIds embed their creation time, so
//! generated ids sort roughly in insertion order.

use bson::oid::ObjectId;
use serde_json::{Map, Value};

/// A JSON document stored inside a collection.
pub type Item = Map<String, Value>;

/// The field holding an item's identity.
pub const ID_FIELD: &str = "_id";

/// Returns the caller supplied id of an item, if it carries a non-empty string `_id`.
pub fn item_id(item: &Item) -> Option<&str> {
    item.get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Generates a fresh, globally unique item id.
pub fn generate_item_id() -> String {
    ObjectId::new().to_hex()
}

/// Resolves the identity of an item and writes it into the payload.
///
/// A non-empty string `_id` is kept as is. Anything else (missing, empty, or not a
/// string) is replaced by a generated id.
pub fn assign_item_id(item: &mut Item) -> String {
    if let Some(id) = item_id(item) {
        return id.to_string();
    }

    let id = generate_item_id();
    item.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    id
}
