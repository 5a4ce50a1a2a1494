use crate::core::{Result, json_param};
use crate::storage::{ScopeRegistry, StoredRecord};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const SAVED_MESSAGE: &str = "Message saved successfully";
pub const CLEARED_MESSAGE: &str = "All stored messages have been cleared";
pub const INVALID_MESSAGE_PAYLOAD: &str = "Invalid JSON in Message Payload field";

/// Response of `getAllMessages` and `getMessagesByPhone`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageList {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub messages: Vec<StoredRecord>,
}

/// Response of `saveMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedMessage {
    pub success: bool,
    pub message: &'static str,
    pub stored: StoredRecord,
}

/// Response of `clearMessages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearedMessages {
    pub success: bool,
    pub message: &'static str,
}

/// Query and mutation operations over scoped message histories.
#[derive(Clone)]
pub struct MessageStoreService {
    registry: Arc<ScopeRegistry>,
}

impl MessageStoreService {
    pub fn new(registry: Arc<ScopeRegistry>) -> Self {
        Self { registry }
    }

    pub async fn get_all_messages(&self, scope: &str) -> MessageList {
        let messages = match self.registry.get(scope).await {
            Some(handle) => {
                let store = handle.read().await;
                store.list_all()
            }
            None => Vec::new(),
        };
        MessageList {
            success: true,
            count: messages.len(),
            phone: None,
            messages,
        }
    }

    pub async fn get_messages_by_phone(&self, scope: &str, phone: &str) -> MessageList {
        let messages = match self.registry.get(scope).await {
            Some(handle) => {
                let store = handle.read().await;
                store.list_by_phone(phone)
            }
            None => Vec::new(),
        };
        MessageList {
            success: true,
            count: messages.len(),
            phone: Some(phone.to_string()),
            messages,
        }
    }

    /// Stores a caller-supplied payload, given inline or as JSON text.
    ///
    /// Malformed JSON text fails before the store is touched.
    pub async fn save_message(&self, scope: &str, payload: &Value) -> Result<SavedMessage> {
        let payload = json_param(payload, INVALID_MESSAGE_PAYLOAD)?;

        let handle = self.registry.scope(scope).await;
        let stored = handle.write().await.insert_manual(payload);
        info!(scope, record = %stored, "message saved manually");

        Ok(SavedMessage {
            success: true,
            message: SAVED_MESSAGE,
            stored,
        })
    }

    pub async fn clear_messages(&self, scope: &str) -> ClearedMessages {
        let removed = match self.registry.get(scope).await {
            Some(handle) => {
                let mut store = handle.write().await;
                store.clear()
            }
            None => 0,
        };
        info!(scope, removed, "stored messages cleared");

        ClearedMessages {
            success: true,
            message: CLEARED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BridgeError;
    use serde_json::json;

    fn service() -> MessageStoreService {
        MessageStoreService::new(Arc::new(ScopeRegistry::new()))
    }

    #[tokio::test]
    async fn test_empty_scope_lists_nothing() {
        let service = service();
        let list = service.get_all_messages("bot").await;

        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"success": true, "count": 0, "messages": []})
        );
    }

    #[tokio::test]
    async fn test_save_then_filter_by_phone() {
        let service = service();
        service
            .save_message("bot", &json!({"from": "+1555", "text": {"body": "a"}}))
            .await
            .unwrap();
        service
            .save_message("bot", &json!(r#"{"from": "+1666"}"#))
            .await
            .unwrap();

        let list = service.get_messages_by_phone("bot", "+1555").await;
        assert_eq!(list.count, 1);
        assert_eq!(list.phone.as_deref(), Some("+1555"));

        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["phone"], "+1555");
        assert_eq!(value["messages"][0]["payload"]["text"]["body"], "a");
        assert!(value["messages"][0]["savedAt"].is_string());

        assert_eq!(service.get_all_messages("bot").await.count, 2);
    }

    #[tokio::test]
    async fn test_save_response_shape() {
        let service = service();
        let saved = service.save_message("bot", &json!({"k": "v"})).await.unwrap();
        let value = serde_json::to_value(&saved).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["message"], SAVED_MESSAGE);
        assert_eq!(value["stored"]["payload"], json!({"k": "v"}));
        assert_eq!(value["stored"]["id"], json!(saved.stored.id));
    }

    #[tokio::test]
    async fn test_invalid_json_leaves_store_untouched() {
        let service = service();
        service.save_message("bot", &json!({"n": 1})).await.unwrap();

        let err = service
            .save_message("bot", &json!("{not json"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::InvalidPayload(INVALID_MESSAGE_PAYLOAD.to_string())
        );
        assert_eq!(service.get_all_messages("bot").await.count, 1);
    }

    #[tokio::test]
    async fn test_clear_messages() {
        let service = service();
        service.save_message("bot", &json!({"from": "+1"})).await.unwrap();

        let cleared = service.clear_messages("bot").await;
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            json!({"success": true, "message": CLEARED_MESSAGE})
        );
        assert_eq!(service.get_all_messages("bot").await.count, 0);
        assert_eq!(service.get_messages_by_phone("bot", "+1").await.count, 0);
    }
}
