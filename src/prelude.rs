//! Entrypoints grouped by how the crate is embedded.
//!
//! `service` is what a host needs to run the HTTP bridge.
//! `library` is the in-process surface for normalizing and storing deliveries.

pub mod service {
    //! Running the bridge as an HTTP service.
    pub use crate::{AppConfig, AppState, WcrmClient, WebhookSettings, build_router};
}

pub mod library {
    //! Embedding the normalizer and history store in another program.
    pub use crate::{
        ActionExecutor, ActionRequest, BridgeError, HistoryStore, MessageStoreService,
        NormalizedEvent, ScopeRegistry, StoredRecord, WcrmApi, WebhookReceiver, normalize,
    };
}
