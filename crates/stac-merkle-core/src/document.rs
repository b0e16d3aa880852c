//! STAC document helpers.
//!
//! Documents are plain `serde_json::Value` objects. The kind is taken from the
//! `type` member: `Feature` is an Item, `Collection` and `Catalog` are interior
//! nodes, anything else is unknown.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::compare_entries;
use crate::errors::{MerkleError, MerkleResult};
use crate::method::HashMethod;
use crate::{
    EXTENSIONS_KEY, HASH_METHOD_KEY, MERKLE_EXTENSION_URL, OBJECT_HASH_KEY, PROPERTIES_KEY,
    ROOT_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Item,
    Collection,
    Catalog,
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub fn is_interior(&self) -> bool {
        matches!(self, NodeKind::Collection | NodeKind::Catalog)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Item => "Item",
            NodeKind::Collection => "Collection",
            NodeKind::Catalog => "Catalog",
            NodeKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn kind_of(doc: &Value) -> NodeKind {
    match doc.get("type").and_then(Value::as_str) {
        Some("Feature") => NodeKind::Item,
        Some("Collection") => NodeKind::Collection,
        Some("Catalog") => NodeKind::Catalog,
        _ => NodeKind::Unknown,
    }
}

/// The document's `id`, or `fallback` when it has none.
pub fn node_id(doc: &Value, fallback: &str) -> String {
    doc.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// The method declared on the document itself, if any.
pub fn declared_method(doc: &Value) -> MerkleResult<Option<HashMethod>> {
    match doc.get(HASH_METHOD_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => HashMethod::from_value(v).map(Some),
    }
}

/// Stored object hash: under `properties` for Items, top-level otherwise.
pub fn stored_object_hash(doc: &Value) -> Option<&str> {
    let holder = if kind_of(doc) == NodeKind::Item {
        doc.get(PROPERTIES_KEY)?
    } else {
        doc
    };
    holder.get(OBJECT_HASH_KEY).and_then(Value::as_str)
}

pub fn stored_root(doc: &Value) -> Option<&str> {
    doc.get(ROOT_KEY).and_then(Value::as_str)
}

fn as_object_mut<'a>(doc: &'a mut Value, what: &str) -> MerkleResult<&'a mut Map<String, Value>> {
    doc.as_object_mut()
        .ok_or_else(|| MerkleError::malformed_document(what, "document is not a JSON object"))
}

/// Add the integrity extension to `stac_extensions` and keep the list sorted.
pub fn ensure_extension(doc: &mut Value) -> MerkleResult<()> {
    let obj = as_object_mut(doc, EXTENSIONS_KEY)?;
    let entry = obj
        .entry(EXTENSIONS_KEY.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    let Value::Array(list) = entry else {
        return Err(MerkleError::malformed_document(
            EXTENSIONS_KEY,
            "stac_extensions is not an array",
        ));
    };

    if !list.iter().any(|v| v.as_str() == Some(MERKLE_EXTENSION_URL)) {
        list.push(Value::String(MERKLE_EXTENSION_URL.to_string()));
    }
    list.sort_by(compare_entries);
    Ok(())
}

/// Write an Item's object hash into `properties`.
pub fn set_item_object_hash(doc: &mut Value, object_hash: &str) -> MerkleResult<()> {
    let obj = as_object_mut(doc, PROPERTIES_KEY)?;
    let props = obj
        .entry(PROPERTIES_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(props) = props else {
        return Err(MerkleError::malformed_document(
            PROPERTIES_KEY,
            "properties is not an object",
        ));
    };
    props.insert(OBJECT_HASH_KEY.to_string(), Value::String(object_hash.to_string()));
    Ok(())
}

/// Write the computed fields of a Collection or Catalog.
pub fn set_interior_fields(
    doc: &mut Value,
    object_hash: &str,
    root: &str,
    method: &HashMethod,
) -> MerkleResult<()> {
    let obj = as_object_mut(doc, OBJECT_HASH_KEY)?;
    obj.insert(OBJECT_HASH_KEY.to_string(), Value::String(object_hash.to_string()));
    obj.insert(ROOT_KEY.to_string(), Value::String(root.to_string()));
    obj.insert(HASH_METHOD_KEY.to_string(), method.to_value());
    Ok(())
}
