use super::record::StoredRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::trace;

/// Capacity used until a caller passes another one.
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded FIFO history of stored messages for one scope.
///
/// After every insert `len() <= capacity` holds: the oldest records are
/// evicted first until it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStore {
    records: VecDeque<StoredRecord>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
        }
    }

    /// Stores an inbound payload, evicting down to `capacity`.
    ///
    /// `capacity` also becomes the bound applied by later [`insert_manual`]
    /// calls. A capacity of zero keeps nothing.
    ///
    /// [`insert_manual`]: HistoryStore::insert_manual
    pub fn append(&mut self, payload: Value, capacity: usize) -> StoredRecord {
        self.capacity = capacity;
        self.push(StoredRecord::received(payload))
    }

    /// Stores a caller-supplied payload under the current capacity.
    pub fn insert_manual(&mut self, payload: Value) -> StoredRecord {
        self.push(StoredRecord::saved(payload))
    }

    fn push(&mut self, record: StoredRecord) -> StoredRecord {
        self.records.push_back(record.clone());
        let evicted = self.evict();
        if evicted > 0 {
            trace!(evicted, capacity = self.capacity, "evicted oldest records");
        }
        record
    }

    /// Drops the oldest records until `len() <= capacity`.
    pub(super) fn evict(&mut self) -> usize {
        let mut evicted = 0;
        while self.records.len() > self.capacity {
            self.records.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// All records, oldest first.
    pub fn list_all(&self) -> Vec<StoredRecord> {
        self.records.iter().cloned().collect()
    }

    /// Records whose payload has a top-level `from` equal to `phone`, oldest first.
    pub fn list_by_phone(&self, phone: &str) -> Vec<StoredRecord> {
        self.records
            .iter()
            .filter(|record| record.sender() == Some(phone))
            .cloned()
            .collect()
    }

    /// Removes every record and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
