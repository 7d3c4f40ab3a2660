//! # Lenient Deserialization
//!
//! `deserialize_with` helpers used by the entity schemas in [`crate::types`].
//!
//! The document store behind the API is schemaless: a price can arrive as
//! `49.99`, `"49.99"` or `null`, a reference as an id string or a populated
//! object. Every helper here maps what it cannot understand to the zero value
//! of the target type, so a malformed field degrades one cell of one row and
//! never the whole listing.
//!
//! ```text
//!   raw JSON ──► lenient::* ──► typed field (zero value on garbage)
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::Ref;

// =============================================================================
// Value-level parsers (shared with FieldValues)
// =============================================================================

/// Reads a JSON value as a number: numbers and numeric strings, else `None`.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Reads a JSON value as display text. Numbers and booleans are rendered,
/// everything else is empty.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Reads a JSON value as a flag: `true`, `"true"`, `1`, `"1"`, `"on"`.
pub fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "on" | "si" | "sí"),
        _ => false,
    }
}

/// Parses the date shapes the backend emits.
///
/// Accepted: RFC 3339 (`2024-01-15T10:00:00.000Z`), naive date-time
/// (`2024-01-15T10:00:00`) and plain dates (`2024-01-15`, read as UTC
/// midnight). Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Reads a JSON value as a date (string forms or epoch milliseconds).
pub fn value_as_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

// =============================================================================
// deserialize_with helpers
// =============================================================================

pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_as_text(&Value::deserialize(d)?))
}

pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(value_as_f64(&Value::deserialize(d)?).unwrap_or(0.0))
}

pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(value_as_f64(&Value::deserialize(d)?)
        .map(|f| f.trunc() as i64)
        .unwrap_or(0))
}

pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(value_as_bool(&Value::deserialize(d)?))
}

pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(value_as_date(&Value::deserialize(d)?))
}

/// Id or populated object; anything else is "no reference".
pub fn reference<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Ref>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(_) | Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Array of `T`; elements that do not decode are dropped, non-arrays are empty.
pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Array of document ids; populated elements contribute their `_id`.
pub fn string_list_of_refs<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map.get("_id").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .filter(|id| !id.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

/// Image list: plain URLs or upload descriptors (`{secure_url}` / `{url}`).
pub fn image_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map
                    .get("secure_url")
                    .or_else(|| map.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .filter(|url| !url.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

/// Nested object that falls back to its `Default` when it does not decode.
pub fn object<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_as_f64() {
        assert_eq!(value_as_f64(&json!(3.5)), Some(3.5));
        assert_eq!(value_as_f64(&json!(" 12 ")), Some(12.0));
        assert_eq!(value_as_f64(&json!("doce")), None);
        assert_eq!(value_as_f64(&json!(null)), None);
    }

    #[test]
    fn test_parse_date_shapes() {
        let d = parse_date("2024-01-15").unwrap();
        assert_eq!(d.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert!(parse_date("2024-01-15T10:30:00.000Z").is_some());
        assert!(parse_date("2024-01-15T10:30:00").is_some());
        assert!(parse_date("15/01/2024").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_value_as_bool() {
        assert!(value_as_bool(&json!(true)));
        assert!(value_as_bool(&json!("true")));
        assert!(value_as_bool(&json!(1)));
        assert!(!value_as_bool(&json!("no")));
        assert!(!value_as_bool(&json!(null)));
    }
}
