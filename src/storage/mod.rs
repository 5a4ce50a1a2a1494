//! In-memory message history
//!
//! - `record.rs` - stored records and id generation
//! - `history.rs` - bounded FIFO store for one scope
//! - `registry.rs` - scope-keyed registry of stores, with snapshots

pub mod history;
pub mod record;
pub mod registry;

pub use history::{DEFAULT_CAPACITY, HistoryStore};
pub use record::{RecordStamp, StoredRecord, next_record_id};
pub use registry::{RegistrySnapshot, ScopeHandle, ScopeRegistry};
