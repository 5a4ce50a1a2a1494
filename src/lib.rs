// ============================================================================
// wCRM Bridge Library
// ============================================================================

pub mod actions;
pub mod config;
pub mod core;
pub mod normalizer;
pub mod outbound;
pub mod prelude;
pub mod storage;
pub mod web;
pub mod webhook;

// Re-export main types for convenience
pub use crate::core::{BridgeError, JsonObject, Result};
pub use normalizer::{EnvelopeShape, InboundEnvelope, NormalizedEvent, normalize};
pub use storage::{HistoryStore, ScopeRegistry, StoredRecord};

// Re-export the operational surface
pub use actions::{ActionExecutor, ActionRequest, ItemResult, MessageStoreService};
pub use config::AppConfig;
pub use outbound::{MessageContent, OutboundMessage, TemplateMessage, WcrmApi, WcrmClient};
pub use web::{AppState, build_router};
pub use webhook::{WebhookReceiver, WebhookSettings};
