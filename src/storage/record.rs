use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a record id of the form `msg_<unix-millis>_<suffix>`.
///
/// The suffix joins a process-wide sequence number with random hex, so two
/// ids minted in the same millisecond never collide within one process.
pub fn next_record_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let sequence = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();
    format!("msg_{millis}_{sequence:x}{}", &random[..7])
}

/// How a record entered the store, with its store time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordStamp {
    /// Captured from an inbound webhook delivery.
    ReceivedAt(#[serde(with = "iso_millis")] DateTime<Utc>),
    /// Inserted through the `saveMessage` operation.
    SavedAt(#[serde(with = "iso_millis")] DateTime<Utc>),
}

/// One entry of a [`HistoryStore`](super::HistoryStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub stamp: RecordStamp,
    pub payload: Value,
}

impl StoredRecord {
    pub fn received(payload: Value) -> Self {
        Self {
            id: next_record_id(),
            stamp: RecordStamp::ReceivedAt(Utc::now()),
            payload,
        }
    }

    pub fn saved(payload: Value) -> Self {
        Self {
            id: next_record_id(),
            stamp: RecordStamp::SavedAt(Utc::now()),
            payload,
        }
    }

    pub fn stored_at(&self) -> DateTime<Utc> {
        match self.stamp {
            RecordStamp::ReceivedAt(at) | RecordStamp::SavedAt(at) => at,
        }
    }

    /// Top-level `from` of the payload, when it is a string.
    pub fn sender(&self) -> Option<&str> {
        self.payload.get("from").and_then(Value::as_str)
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for StoredRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {}",
            self.id,
            self.stored_at().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_record_ids_are_unique_in_tight_loops() {
        let ids: HashSet<String> = (0..10_000).map(|_| next_record_id()).collect();
        assert_eq!(ids.len(), 10_000);
        assert!(ids.iter().all(|id| id.starts_with("msg_")));
    }

    #[test]
    fn test_received_record_serialization() {
        let record = StoredRecord::received(json!({"from": "+1"}));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], json!(record.id));
        assert_eq!(value["payload"], json!({"from": "+1"}));
        assert!(value.get("savedAt").is_none());

        let received_at = value["receivedAt"].as_str().unwrap();
        assert!(received_at.ends_with('Z'));
        // 2026-01-01T00:00:00.000Z
        assert_eq!(received_at.len(), 24);
    }

    #[test]
    fn test_saved_record_round_trips() {
        let record = StoredRecord::saved(json!({"note": "manual"}));
        let text = serde_json::to_string(&record).unwrap();
        assert!(text.contains("\"savedAt\""));

        let decoded: StoredRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded.id, record.id);
        assert!(matches!(decoded.stamp, RecordStamp::SavedAt(_)));
    }

    #[test]
    fn test_display_shows_id_and_stamp() {
        let record = StoredRecord::saved(json!({}));
        let shown = record.to_string();
        assert!(shown.starts_with(&format!("{} @ ", record.id)));
        assert!(shown.ends_with('Z'));
    }

    #[test]
    fn test_sender_requires_string_from() {
        assert_eq!(
            StoredRecord::received(json!({"from": "+1555"})).sender(),
            Some("+1555")
        );
        assert_eq!(StoredRecord::received(json!({"from": 1555})).sender(), None);
        assert_eq!(StoredRecord::received(json!({"to": "+1555"})).sender(), None);
    }
}
