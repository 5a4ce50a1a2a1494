use super::{BridgeError, Result};
use serde_json::{Map, Value};

/// A JSON object as received on the wire.
pub type JsonObject = Map<String, Value>;

/// Returns the object if `value` is a JSON object with at least one key.
pub fn non_empty_object(value: &Value) -> Option<&JsonObject> {
    value.as_object().filter(|object| !object.is_empty())
}

/// Resolves a parameter that may arrive either as JSON text or as an inline
/// JSON value.
///
/// Form-style callers send `"[1, 2]"` while programmatic callers send `[1, 2]`;
/// both resolve to the same value. Text that does not parse fails with
/// `InvalidPayload` carrying `error_message`.
pub fn json_param(value: &Value, error_message: &str) -> Result<Value> {
    match value {
        Value::String(text) => serde_json::from_str(text)
            .map_err(|_| BridgeError::invalid_payload(error_message)),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_empty_object() {
        assert!(non_empty_object(&json!({"a": 1})).is_some());
        assert!(non_empty_object(&json!({})).is_none());
        assert!(non_empty_object(&json!([1])).is_none());
        assert!(non_empty_object(&Value::Null).is_none());
    }

    #[test]
    fn test_json_param_accepts_text_and_inline_values() {
        assert_eq!(json_param(&json!("[1, 2]"), "bad").unwrap(), json!([1, 2]));
        assert_eq!(json_param(&json!([1, 2]), "bad").unwrap(), json!([1, 2]));

        let err = json_param(&json!("{nope"), "Invalid JSON in Buttons field").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON in Buttons field");
    }
}
