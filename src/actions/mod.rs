//! Operational surface: stored-history operations and outbound sends.
//!
//! # Architecture
//!
//! - **operation.rs**: resource/operation names and their validation
//! - **params.rs**: typed access to one item's parameter object
//! - **compose.rs**: item parameters to outbound messages
//! - **store.rs**: history store operations and their response bodies
//!
//! [`ActionExecutor`] runs one resource/operation pair over a batch of
//! items. Each item yields one or more result items tagged with the index
//! of the input item that produced them.

pub mod compose;
pub mod operation;
pub mod params;
pub mod store;

pub use compose::{compose_message, compose_template};
pub use operation::{MessageOperation, Operation, Resource, StoreOperation, TemplateOperation};
pub use params::ItemParams;
pub use store::{ClearedMessages, MessageList, MessageStoreService, SavedMessage};

use crate::core::{BridgeError, JsonObject, Result};
use crate::outbound::WcrmApi;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// A batch of items to run through one resource/operation pair.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub resource: String,
    pub operation: String,
    #[serde(default)]
    pub items: Vec<JsonObject>,
    #[serde(default)]
    pub continue_on_fail: bool,
}

impl ActionRequest {
    pub fn new(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            operation: operation.into(),
            ..Self::default()
        }
    }

    pub fn item(mut self, params: Value) -> Self {
        if let Value::Object(values) = params {
            self.items.push(values);
        }
        self
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One output item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub json: Value,
    pub paired_item: PairedItem,
}

impl ItemResult {
    fn new(json: Value, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }

    fn error(err: &BridgeError, item: usize) -> Self {
        Self::new(json!({ "error": err.to_string() }), item)
    }

    pub fn is_error(&self) -> bool {
        self.json.get("error").is_some()
    }
}

/// Runs action batches against the history store and the outbound API.
#[derive(Clone)]
pub struct ActionExecutor {
    store: MessageStoreService,
    api: Option<Arc<dyn WcrmApi>>,
}

impl ActionExecutor {
    pub fn new(store: MessageStoreService, api: Option<Arc<dyn WcrmApi>>) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &MessageStoreService {
        &self.store
    }

    /// Executes `request` within `scope`.
    ///
    /// Without `continue_on_fail` the first failing item aborts the batch.
    /// With it, each failure becomes an `{error}` item and the batch goes on.
    /// A request with no items runs once with empty parameters.
    pub async fn execute(&self, scope: &str, request: &ActionRequest) -> Result<Vec<ItemResult>> {
        let empty = [JsonObject::new()];
        let items: &[JsonObject] = if request.items.is_empty() {
            &empty
        } else {
            &request.items
        };

        let operation = Operation::parse(&request.resource, &request.operation);
        debug!(
            scope,
            resource = %request.resource,
            operation = %request.operation,
            items = items.len(),
            "executing action"
        );

        let mut results = Vec::with_capacity(items.len());
        for (index, values) in items.iter().enumerate() {
            let outcome = match &operation {
                Ok(operation) => self.run_item(scope, *operation, ItemParams::new(values)).await,
                Err(err) => Err(err.clone()),
            };

            match outcome {
                Ok(response) => results.extend(split_response(response, index)),
                Err(err) if request.continue_on_fail => {
                    warn!(scope, item = index, error = %err, "action item failed");
                    results.push(ItemResult::error(&err, index));
                }
                Err(err) => return Err(err),
            }
        }

        Ok(results)
    }

    async fn run_item(&self, scope: &str, operation: Operation, params: ItemParams<'_>) -> Result<Value> {
        debug!(scope, resource = %operation.resource(), "running action item");
        match operation {
            Operation::Message(op) => {
                let message = compose_message(op, params)?;
                self.api()?.send_message(&message).await
            }
            Operation::Template(TemplateOperation::SendTemplate) => {
                let template = compose_template(params)?;
                self.api()?.send_template(&template).await
            }
            Operation::Store(op) => self.run_store(scope, op, params).await,
        }
    }

    async fn run_store(&self, scope: &str, op: StoreOperation, params: ItemParams<'_>) -> Result<Value> {
        let response = match op {
            StoreOperation::GetAllMessages => {
                serde_json::to_value(self.store.get_all_messages(scope).await)?
            }
            StoreOperation::GetMessagesByPhone => {
                let phone = params.string("filterPhone")?;
                serde_json::to_value(self.store.get_messages_by_phone(scope, &phone).await)?
            }
            StoreOperation::SaveMessage => {
                let payload = params.value("messagePayload")?;
                serde_json::to_value(self.store.save_message(scope, payload).await?)?
            }
            StoreOperation::ClearMessages => {
                serde_json::to_value(self.store.clear_messages(scope).await)?
            }
        };
        Ok(response)
    }

    fn api(&self) -> Result<&dyn WcrmApi> {
        self.api
            .as_deref()
            .ok_or_else(|| BridgeError::Config("wCRM API key is not configured".to_string()))
    }
}

/// An array response yields one item per element, anything else one item.
fn split_response(response: Value, index: usize) -> Vec<ItemResult> {
    match response {
        Value::Array(elements) => elements
            .into_iter()
            .map(|json| ItemResult::new(json, index))
            .collect(),
        json => vec![ItemResult::new(json, index)],
    }
}
