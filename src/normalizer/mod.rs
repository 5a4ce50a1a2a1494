//! Inbound payload normalizer
//!
//! Turns a raw webhook body into a [`NormalizedEvent`]: a flat record with the
//! same fields whichever wire shape arrived.
//!
//! # Architecture
//!
//! - `envelope.rs` - wire shapes and the shape dispatch (`InboundEnvelope`)
//! - `lenient.rs` - serde helpers that treat mistyped fields as absent

mod envelope;
mod lenient;

pub use envelope::{
    CLOUD_OBJECT, ChangeValue, CloudEnvelope, CloudMessage, Contact, EnvelopeShape, FlatEnvelope,
    InboundEnvelope, Metadata, Profile, TextContent, Timestamp,
};

use crate::core::{BridgeError, Result, non_empty_object};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Shape-independent view of one inbound delivery.
///
/// Extracted fields are `None` when the envelope does not carry them and are
/// left out of the serialized form, so consumers can tell "absent" from "empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    /// Scope key of the webhook that received the delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    /// Public URL of the receiving webhook; empty when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    pub headers: Value,
    /// The inbound body, unmodified.
    pub body: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,

    // Cloud API envelope only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_wa_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<Value>>,
}

impl NormalizedEvent {
    fn passthrough(body: &Value, headers: &Value) -> Self {
        Self {
            headers: headers.clone(),
            body: body.clone(),
            ..Self::default()
        }
    }

    fn apply_cloud(&mut self, envelope: &CloudEnvelope) {
        let Some(value) = envelope.first_value() else {
            return;
        };

        if let Some(metadata) = value.metadata {
            self.phone_number_id = metadata.phone_number_id;
            self.display_phone_number = metadata.display_phone_number;
        }

        if let Some(contact) = value.contacts {
            self.contact_wa_id = contact.wa_id;
            self.contact_name = contact.profile.and_then(|profile| profile.name);
        }

        if let Some(message) = value.messages {
            self.from = message.from;
            self.message_id = message.id;
            self.message_type = message.message_type;
            self.timestamp = message.timestamp;
            self.text_body = message.text.and_then(|text| text.body);
        }

        self.statuses = value.statuses;
    }

    fn apply_flat(&mut self, envelope: FlatEnvelope) {
        self.from = envelope.from;
        self.message_type = envelope.message_type;
        self.timestamp = envelope.timestamp;
        self.text_body = envelope.text.and_then(|text| text.body);
    }
}

/// Normalizes one inbound webhook body.
///
/// Fails with [`BridgeError::EmptyPayload`] unless `body` is a JSON object with
/// at least one key. Otherwise never fails: missing or mistyped fields are
/// simply absent from the result. Pure; the same input always yields the same
/// event.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wcrm_bridge::normalize;
///
/// let body = json!({"from": "+1", "type": "text", "text": {"body": "hi"}});
/// let event = normalize(&body, &json!({})).unwrap();
/// assert_eq!(event.from.as_deref(), Some("+1"));
/// assert_eq!(event.text_body.as_deref(), Some("hi"));
/// ```
pub fn normalize(body: &Value, headers: &Value) -> Result<NormalizedEvent> {
    if non_empty_object(body).is_none() {
        return Err(BridgeError::EmptyPayload);
    }

    let envelope = InboundEnvelope::decode(body);
    trace!(shape = envelope.shape().as_str(), "decoded inbound envelope");

    let mut event = NormalizedEvent::passthrough(body, headers);
    match envelope {
        InboundEnvelope::Cloud(cloud) => event.apply_cloud(&cloud),
        InboundEnvelope::Flat(flat) => event.apply_flat(flat),
    }
    Ok(event)
}
