use super::history::{DEFAULT_CAPACITY, HistoryStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared handle on one scope's history.
///
/// Hold the write guard across a whole read-modify-write sequence so the
/// capacity invariant survives concurrent deliveries to the same scope.
pub type ScopeHandle = Arc<RwLock<HistoryStore>>;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Registry of history stores keyed by scope (one webhook / workflow node).
///
/// Stores are created empty on first access, bounded by the registry's
/// capacity, and live until the process exits.
pub struct ScopeRegistry {
    scopes: RwLock<HashMap<String, ScopeHandle>>,
    capacity: usize,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Registry whose new scopes start with `capacity` as their bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Returns the scope's store, creating an empty one if needed.
    pub async fn scope(&self, key: &str) -> ScopeHandle {
        if let Some(handle) = self.scopes.read().await.get(key) {
            return Arc::clone(handle);
        }

        let mut scopes = self.scopes.write().await;
        let handle = scopes.entry(key.to_string()).or_insert_with(|| {
            debug!(scope = key, capacity = self.capacity, "creating history scope");
            Arc::new(RwLock::new(HistoryStore::with_capacity(self.capacity)))
        });
        Arc::clone(handle)
    }

    /// Returns the scope's store without creating it.
    pub async fn get(&self, key: &str) -> Option<ScopeHandle> {
        self.scopes.read().await.get(key).cloned()
    }

    /// Copies every scope into a serializable snapshot.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        let handles: Vec<(String, ScopeHandle)> = self
            .scopes
            .read()
            .await
            .iter()
            .map(|(key, handle)| (key.clone(), Arc::clone(handle)))
            .collect();

        let mut scopes = BTreeMap::new();
        for (key, handle) in handles {
            scopes.insert(key, handle.read().await.clone());
        }

        RegistrySnapshot {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            scopes,
        }
    }

    /// Replaces all scopes with the contents of `snapshot`.
    ///
    /// Stores holding more records than their capacity are trimmed, oldest
    /// first, before they become visible.
    pub async fn restore(&self, snapshot: RegistrySnapshot) {
        let restored: HashMap<String, ScopeHandle> = snapshot
            .scopes
            .into_iter()
            .map(|(key, mut store)| {
                let evicted = store.evict();
                if evicted > 0 {
                    debug!(scope = %key, evicted, "trimmed restored scope to capacity");
                }
                (key, Arc::new(RwLock::new(store)))
            })
            .collect();

        debug!(scopes = restored.len(), "restored history scopes");
        *self.scopes.write().await = restored;
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of a [`ScopeRegistry`], for hosts that persist scope
/// state outside the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub scopes: BTreeMap<String, HistoryStore>,
}
