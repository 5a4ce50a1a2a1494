//! Wire shapes of inbound WhatsApp webhook deliveries.
//!
//! Two shapes are recognised:
//! - the nested Cloud API envelope (`object` / `entry[]` / `changes[]` / `value`),
//! - a flat, pre-extracted payload used by test senders and relays.
//!
//! Every nested field is optional and decoded leniently.

use super::lenient::{decode_object, lenient, lenient_first_object, lenient_object};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Discriminator value of Cloud API webhook envelopes.
pub const CLOUD_OBJECT: &str = "whatsapp_business_account";

/// Message timestamp. Cloud API sends unix seconds as a string, relays
/// sometimes send a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Text(String),
    Number(Number),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextContent {
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
}

// ============================================================================
// Cloud API envelope
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CloudEnvelope {
    pub object: String,
    pub entry: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloudEntry {
    #[serde(default, deserialize_with = "lenient_first_object")]
    pub changes: Option<CloudChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloudChange {
    #[serde(default, deserialize_with = "lenient_object")]
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChangeValue {
    #[serde(default, deserialize_with = "lenient_object")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient_first_object")]
    pub contacts: Option<Contact>,
    #[serde(default, deserialize_with = "lenient_first_object")]
    pub messages: Option<CloudMessage>,
    #[serde(default, deserialize_with = "lenient")]
    pub statuses: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient")]
    pub phone_number_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient")]
    pub wa_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CloudMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub message_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub text: Option<TextContent>,
}

impl CloudEnvelope {
    /// `entry[0].changes[0].value`, if every step of the path is present.
    pub fn first_value(&self) -> Option<ChangeValue> {
        let entry: CloudEntry = decode_object(self.entry.first()?.clone())?;
        entry.changes?.value
    }
}

// ============================================================================
// Flat payload
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FlatEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub message_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub text: Option<TextContent>,
}

// ============================================================================
// Shape dispatch
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    Cloud,
    Flat,
}

impl EnvelopeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Flat => "flat",
        }
    }
}

/// A decoded inbound envelope. Exactly one variant is produced per body.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEnvelope {
    Cloud(CloudEnvelope),
    Flat(FlatEnvelope),
}

impl InboundEnvelope {
    /// Decodes `body`, trying the Cloud API envelope first.
    ///
    /// A body is a Cloud envelope when `object` is [`CLOUD_OBJECT`] and `entry`
    /// is an array. Anything else is read as a flat payload; a body with none
    /// of the flat fields decodes to an empty `FlatEnvelope`.
    pub fn decode(body: &Value) -> Self {
        if let Ok(cloud) = CloudEnvelope::deserialize(body) {
            if cloud.object == CLOUD_OBJECT {
                return Self::Cloud(cloud);
            }
        }
        Self::Flat(FlatEnvelope::deserialize(body).unwrap_or_default())
    }

    pub fn shape(&self) -> EnvelopeShape {
        match self {
            Self::Cloud(_) => EnvelopeShape::Cloud,
            Self::Flat(_) => EnvelopeShape::Flat,
        }
    }
}
