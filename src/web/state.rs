use crate::actions::{ActionExecutor, MessageStoreService};
use crate::outbound::WcrmApi;
use crate::storage::ScopeRegistry;
use crate::webhook::{WebhookReceiver, WebhookSettings};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub receiver: Arc<WebhookReceiver>,
    pub executor: ActionExecutor,
}

impl AppState {
    pub fn new(receiver: Arc<WebhookReceiver>, executor: ActionExecutor) -> Self {
        Self { receiver, executor }
    }

    /// Wires a receiver and an executor over one shared scope registry.
    ///
    /// Scopes are bounded by `settings.max_stored_messages` from the start,
    /// so manual saves respect it even when inbound storage is off.
    pub fn build(settings: WebhookSettings, api: Option<Arc<dyn WcrmApi>>) -> Self {
        let registry = Arc::new(ScopeRegistry::with_capacity(settings.max_stored_messages));
        let receiver = Arc::new(WebhookReceiver::new(registry.clone(), settings));
        let executor = ActionExecutor::new(MessageStoreService::new(registry), api);
        Self::new(receiver, executor)
    }

    pub fn store(&self) -> &MessageStoreService {
        self.executor.store()
    }
}
