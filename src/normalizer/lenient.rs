//! Serde helpers for best-effort decoding of webhook payloads.
//!
//! Webhook senders are loose about types. A nested field whose JSON type does
//! not match is treated as absent instead of failing the whole document, so
//! one bad field never hides its siblings.
//!
//! Struct targets go through the `_object` variants: serde binds a JSON array
//! to struct fields by position, which must not happen for webhook fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes `T`, yielding `None` when the value is null or has the wrong shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(T::deserialize(value).ok())
}

/// Like [`lenient`], for struct targets: only a JSON object decodes.
pub fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_object(value))
}

/// Decodes the first element of a JSON array, which must be a JSON object.
///
/// Anything other than a non-empty array yields `None`. Later elements are
/// ignored.
pub fn lenient_first_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(mut items) if !items.is_empty() => Ok(decode_object(items.swap_remove(0))),
        _ => Ok(None),
    }
}

/// Decodes `value` as `T` only when it is a JSON object.
pub fn decode_object<T: DeserializeOwned>(value: Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    T::deserialize(value).ok()
}
