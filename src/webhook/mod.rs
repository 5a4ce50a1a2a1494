//! Inbound webhook receiver
//!
//! Validates a delivery, records it in the scope's history when enabled and
//! returns the normalized event.

use crate::core::{BridgeError, Result};
use crate::normalizer::{NormalizedEvent, normalize};
use crate::storage::{DEFAULT_CAPACITY, ScopeRegistry};
use http::HeaderMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_WEBHOOK_PATH: &str = "wcrm-webhook";

/// Behaviour of the inbound webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Default scope key, served at `/webhook` and `/webhook/<path>`.
    pub path: String,
    /// Record inbound bodies in the history store.
    pub store_messages: bool,
    /// Capacity passed to the history store on each delivery.
    pub max_stored_messages: usize,
    /// Externally visible base URL of this service.
    pub public_base_url: Option<String>,
}

impl WebhookSettings {
    /// Public URL of the webhook for `scope`, or an empty string when no
    /// public base URL is configured.
    pub fn webhook_url(&self, scope: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/webhook/{scope}"),
            None => String::new(),
        }
    }
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_WEBHOOK_PATH.to_string(),
            store_messages: true,
            max_stored_messages: DEFAULT_CAPACITY,
            public_base_url: None,
        }
    }
}

pub struct WebhookReceiver {
    registry: Arc<ScopeRegistry>,
    settings: WebhookSettings,
}

impl WebhookReceiver {
    pub fn new(registry: Arc<ScopeRegistry>, settings: WebhookSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &WebhookSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<ScopeRegistry> {
        &self.registry
    }

    /// Handles one raw delivery for `scope`.
    ///
    /// Bodies that are blank, not JSON, or not a non-empty JSON object fail
    /// with [`BridgeError::EmptyPayload`] and leave the store untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use std::sync::Arc;
    /// use wcrm_bridge::{ScopeRegistry, WebhookReceiver, WebhookSettings};
    ///
    /// # tokio_test::block_on(async {
    /// let registry = Arc::new(ScopeRegistry::new());
    /// let receiver = WebhookReceiver::new(registry, WebhookSettings::default());
    ///
    /// let event = receiver
    ///     .receive("wcrm-webhook", json!({}), br#"{"from": "+1"}"#)
    ///     .await
    ///     .unwrap();
    /// assert_eq!(event.from.as_deref(), Some("+1"));
    /// assert_eq!(event.webhook_id.as_deref(), Some("wcrm-webhook"));
    /// # });
    /// ```
    pub async fn receive(
        &self,
        scope: &str,
        headers: Value,
        raw_body: &[u8],
    ) -> Result<NormalizedEvent> {
        let body = parse_body(raw_body)?;
        self.receive_json(scope, headers, body).await
    }

    /// Handles a delivery addressed to the configured default path.
    pub async fn receive_default(&self, headers: Value, raw_body: &[u8]) -> Result<NormalizedEvent> {
        let scope = self.settings.path.clone();
        self.receive(&scope, headers, raw_body).await
    }

    /// Same as [`receive`](Self::receive) for an already parsed body.
    pub async fn receive_json(
        &self,
        scope: &str,
        headers: Value,
        body: Value,
    ) -> Result<NormalizedEvent> {
        let mut event = normalize(&body, &headers)?;

        if self.settings.store_messages {
            let handle = self.registry.scope(scope).await;
            let mut store = handle.write().await;
            let record = store.append(body, self.settings.max_stored_messages);
            debug!(
                scope,
                record_id = %record.id,
                stored = store.len(),
                "recorded inbound message"
            );
        }

        info!(
            scope,
            from = event.from.as_deref().unwrap_or("-"),
            message_type = event.message_type.as_deref().unwrap_or("-"),
            "webhook delivery received"
        );

        event.webhook_id = Some(scope.to_string());
        event.webhook_url = Some(self.settings.webhook_url(scope));
        Ok(event)
    }
}

/// Parses a raw webhook body. Anything but JSON counts as an empty payload.
pub fn parse_body(raw: &[u8]) -> Result<Value> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(BridgeError::EmptyPayload);
    }
    serde_json::from_slice(raw).map_err(|_| BridgeError::EmptyPayload)
}

/// Converts request headers to a JSON object of lowercase name -> value.
///
/// Repeated headers are joined with `", "`; non-UTF-8 bytes are replaced.
pub fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut object = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        object.insert(name.as_str().to_string(), Value::String(joined));
    }
    Value::Object(object)
}
