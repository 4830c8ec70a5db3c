//! Conversion between request/response JSON and stored BSON documents
//!
//! Stored documents carry driver types (`ObjectId`, BSON datetimes). On the
//! way out these render the way storefront clients expect: ids as 24-hex
//! strings and datetimes as RFC 3339. Everything else uses relaxed
//! extended JSON.

use bson::{doc, oid::ObjectId, Bson, Document};
use serde::Serializer;
use serde_json::{Map, Value};

use crate::types::HavenError;

/// Parse a path id into an `ObjectId`
pub fn object_id(id: &str) -> Result<ObjectId, HavenError> {
    Ok(ObjectId::parse_str(id.trim())?)
}

/// Filter matching a single document by `_id`
pub fn id_filter(id: &str) -> Result<Document, HavenError> {
    Ok(doc! { "_id": object_id(id)? })
}

/// Filter matching documents owned by an email
pub fn email_filter(email: &str) -> Document {
    doc! { "email": email }
}

/// Convert a JSON request body into a document. Only objects are accepted.
pub fn json_to_document(value: Value) -> Result<Document, HavenError> {
    match value {
        Value::Object(map) => Ok(bson::to_document(&map)?),
        other => Err(HavenError::BadRequest(format!(
            "Expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Render a BSON value as client-facing JSON
pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(dt.to_chrono().to_rfc3339()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}

/// Render a whole document as a JSON object
pub fn document_to_json(doc: &Document) -> Value {
    let map: Map<String, Value> = doc
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_json(value)))
        .collect();
    Value::Object(map)
}

/// serde adapter for BSON fields in response structs
pub fn serialize_bson<S: Serializer>(value: &Bson, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_some(&bson_to_json(value))
}

/// serde adapter for optional BSON fields in response structs
pub fn serialize_opt_bson<S: Serializer>(
    value: &Option<Bson>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&bson_to_json(v)),
        None => serializer.serialize_none(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
