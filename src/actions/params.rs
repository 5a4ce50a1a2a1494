use crate::core::{BridgeError, JsonObject, Result, json_param};
use serde_json::Value;

/// Named parameters of one action item.
#[derive(Debug, Clone, Copy)]
pub struct ItemParams<'a> {
    values: &'a JsonObject,
}

impl<'a> ItemParams<'a> {
    pub fn new(values: &'a JsonObject) -> Self {
        Self { values }
    }

    fn present(&self, name: &str) -> Option<&'a Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    /// Required parameter as JSON.
    pub fn value(&self, name: &str) -> Result<&'a Value> {
        self.present(name).ok_or_else(|| BridgeError::missing(name))
    }

    /// Required text parameter. Numbers and booleans are accepted in their
    /// textual form.
    pub fn string(&self, name: &str) -> Result<String> {
        match self.value(name)? {
            Value::String(text) => Ok(text.clone()),
            scalar @ (Value::Number(_) | Value::Bool(_)) => Ok(scalar.to_string()),
            _ => Err(BridgeError::invalid_payload(format!(
                "Parameter '{name}' must be a string"
            ))),
        }
    }

    /// Optional text parameter, empty when absent.
    pub fn string_or_empty(&self, name: &str) -> Result<String> {
        match self.present(name) {
            Some(_) => self.string(name),
            None => Ok(String::new()),
        }
    }

    /// Optional flag, `false` when absent.
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.present(name) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(BridgeError::invalid_payload(format!(
                "Parameter '{name}' must be a boolean"
            ))),
        }
    }

    /// Required JSON parameter given either inline or as JSON text.
    pub fn json(&self, name: &str, error_message: &str) -> Result<Value> {
        json_param(self.value(name)?, error_message)
    }
}
