use bson::{Bson, Document};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Convert a stored document into the public wire format.
/// `_id` becomes a hex `id`, timestamps become RFC 3339 strings.
pub fn document_to_api_value(document: Document) -> Value {
    let mut object = Map::with_capacity(document.len());

    for (key, value) in document {
        if key == "_id" {
            object.insert("id".to_string(), bson_to_json(value));
        } else {
            object.insert(key, bson_to_json(value));
        }
    }

    Value::Object(object)
}

pub fn documents_to_api_values(documents: Vec<Document>) -> Vec<Value> {
    documents.into_iter().map(document_to_api_value).collect()
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(text) => Value::String(text),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Document(doc) => document_to_api_value(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Request bodies must be JSON objects
pub fn document_from_json(body: Value) -> Result<Document, ApiError> {
    match body {
        Value::Object(_) => bson::to_document(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e))),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId, DateTime};
    use serde_json::json;

    #[test]
    fn object_id_becomes_hex_id() {
        let oid = ObjectId::new();
        let value = document_to_api_value(doc! { "_id": oid, "code": "7" });

        assert_eq!(value["id"], json!(oid.to_hex()));
        assert!(value.get("_id").is_none());
        assert_eq!(value["code"], "7");
    }

    #[test]
    fn timestamps_are_rfc3339() {
        let value = document_to_api_value(doc! { "createdAt": DateTime::from_millis(0) });
        assert_eq!(value["createdAt"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn nested_values_are_plain_json() {
        let value = document_to_api_value(doc! {
            "traits": ["calm", "curious"],
            "details": { "luckyNumber": 7_i32 }
        });
        assert_eq!(value["traits"], json!(["calm", "curious"]));
        assert_eq!(value["details"]["luckyNumber"], 7);
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(document_from_json(json!(["code"])).is_err());
        let document = document_from_json(json!({ "title": "Seeker" })).unwrap();
        assert_eq!(document.get_str("title").unwrap(), "Seeker");
    }
}
