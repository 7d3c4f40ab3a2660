//! # Response Envelopes
//!
//! List endpoints answer in one of two shapes:
//!
//! ```text
//!   [ {...}, {...} ]                          bare array
//!   { "success": true, "data": [ {...} ] }    data envelope ("success" optional)
//!   { "success": false, "message": "..." }    rejection  → ApiError::Rejected
//!   anything else                             → ApiError::MalformedEnvelope
//! ```
//!
//! Records that fail to decode are skipped with a warning; the rest of the
//! listing is kept.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// Extracts the record array from a list response.
pub fn unwrap_list(body: Value) -> ApiResult<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if map.get("success").and_then(Value::as_bool) == Some(false) {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("request rejected")
                    .to_string();
                return Err(ApiError::Rejected(message));
            }
            match map.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                Some(other) => Err(ApiError::MalformedEnvelope(format!(
                    "`data` is {}, expected an array",
                    kind_of(&other)
                ))),
                None => Err(ApiError::MalformedEnvelope(
                    "object without a `data` array".to_string(),
                )),
            }
        }
        other => Err(ApiError::MalformedEnvelope(format!(
            "{}, expected an array",
            kind_of(&other)
        ))),
    }
}

/// Decodes a list response into records, skipping the ones that do not
/// decode.
pub fn decode_list<T: DeserializeOwned>(body: Value) -> ApiResult<Vec<T>> {
    let items = unwrap_list(body)?;
    let total = items.len();

    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, error = %err, "skipping record that does not decode");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(skipped = total - records.len(), total, "some records were skipped");
    }
    Ok(records)
}

/// Backend `message` of an error body, if it has one.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optica_core::types::Client;
    use serde_json::json;

    #[test]
    fn test_both_shapes() {
        assert_eq!(unwrap_list(json!([1, 2])).unwrap().len(), 2);
        assert_eq!(unwrap_list(json!({ "success": true, "data": [1] })).unwrap().len(), 1);
        assert_eq!(unwrap_list(json!({ "data": [] })).unwrap().len(), 0);
    }

    #[test]
    fn test_malformed_and_rejected() {
        assert!(matches!(unwrap_list(json!({ "items": [] })), Err(ApiError::MalformedEnvelope(_))));
        assert!(matches!(unwrap_list(json!({ "data": {} })), Err(ApiError::MalformedEnvelope(_))));
        assert!(matches!(unwrap_list(json!("hola")), Err(ApiError::MalformedEnvelope(_))));
        match unwrap_list(json!({ "success": false, "message": "Sin permisos" })) {
            Err(ApiError::Rejected(message)) => assert_eq!(message, "Sin permisos"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_records_are_skipped() {
        let clients: Vec<Client> = decode_list(json!([
            { "_id": "1", "nombre": "Ana", "edad": "33" },
            42,
            { "_id": "2", "nombre": "Luis", "direccion": null }
        ]))
        .unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].edad, 33);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(br#"{"message":"No encontrado"}"#).as_deref(), Some("No encontrado"));
        assert_eq!(error_message(b"<html>"), None);
    }
}
