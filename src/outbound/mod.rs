//! Outbound message formatting and the wCRM HTTP client.

mod client;
mod message;

pub use client::{
    DEFAULT_API_BASE_URL, SEND_MESSAGE_ENDPOINT, SEND_TEMPLATE_ENDPOINT, WcrmApi, WcrmClient,
};
pub use message::{MessageContent, OutboundMessage, TemplateMessage};
