//! Response envelope decoding
//!
//! The backend wraps payloads as `{ success, data, message }`. The client
//! strips that outer layer for every response ([`unwrap_data`]); what is left
//! still varies per resource for list endpoints:
//!
//! - `Direct`:    `[ ... ]`
//! - `Items`:     `{ "items": [ ... ], "total": N }`
//! - `Data`:      `{ "data": [ ... ] }`
//! - `DataItems`: `{ "data": { "items": [ ... ] } }`
//!
//! Each endpoint declares which shapes it accepts, in priority order.

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};

/// One accepted list envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    Direct,
    Items,
    Data,
    DataItems,
}

impl ListShape {
    /// Borrow the array for this shape, if the value has it
    fn locate<'a>(&self, value: &'a JsonValue) -> Option<&'a Vec<JsonValue>> {
        match self {
            ListShape::Direct => value.as_array(),
            ListShape::Items => value.get("items")?.as_array(),
            ListShape::Data => value.get("data")?.as_array(),
            ListShape::DataItems => value.get("data")?.get("items")?.as_array(),
        }
    }
}

/// Shapes accepted by paginated resources (expenses, incomes, budgets)
pub const PAGED_LIST: &[ListShape] = &[
    ListShape::Direct,
    ListShape::DataItems,
    ListShape::Items,
    ListShape::Data,
];

/// Shapes accepted by categories
pub const SIMPLE_LIST: &[ListShape] = &[ListShape::Direct, ListShape::Items, ListShape::Data];

/// Replace `{ data: X, ... }` with `X`; any other value passes through
pub fn unwrap_data(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(JsonValue::Null)
        }
        other => other,
    }
}

/// Unwrap a second `data` layer (used by limits and reports)
///
/// A present key is unwrapped even when null, so `{ "data": null }` becomes
/// `null` and reads as "no record".
pub fn extract_data(value: JsonValue) -> JsonValue {
    unwrap_data(value)
}

/// Pull the record array out of a list response
///
/// The first matching shape wins; an unrecognized body yields an empty list.
pub fn extract_list(value: &JsonValue, shapes: &[ListShape]) -> Vec<JsonValue> {
    shapes
        .iter()
        .find_map(|shape| shape.locate(value))
        .cloned()
        .unwrap_or_default()
}

/// Extract and deserialize a list of records
pub fn decode_list<T: DeserializeOwned>(value: &JsonValue, shapes: &[ListShape]) -> Result<Vec<T>> {
    extract_list(value, shapes)
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| Error::decode(format!("record {}: {}", index, e)))
        })
        .collect()
}

/// Deserialize a single record
pub fn decode_record<T: DeserializeOwned>(value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::decode(e.to_string()))
}

/// Deserialize a record that the backend may omit (`null` or empty body)
pub fn decode_optional<T: DeserializeOwned>(value: JsonValue) -> Result<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    decode_record(value).map(Some)
}
