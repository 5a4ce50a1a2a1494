use crate::core::{BridgeError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Message,
    MessageStore,
    Template,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::MessageStore => "messageStore",
            Self::Template => "template",
        }
    }
}

impl FromStr for Resource {
    type Err = BridgeError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "message" => Ok(Self::Message),
            "messageStore" => Ok(Self::MessageStore),
            "template" => Ok(Self::Template),
            other => Err(BridgeError::UnknownResource(other.to_string())),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOperation {
    SendText,
    SendImage,
    SendAudio,
    SendDocument,
    SendVideo,
    SendInteractiveList,
    SendInteractiveButtons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    GetAllMessages,
    GetMessagesByPhone,
    SaveMessage,
    ClearMessages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOperation {
    SendTemplate,
}

/// A resource/operation pair that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Message(MessageOperation),
    Store(StoreOperation),
    Template(TemplateOperation),
}

impl Operation {
    /// Resolves `operation` within `resource`.
    ///
    /// Operation names are only valid under their own resource, so
    /// `("template", "sendText")` is an unknown operation.
    pub fn parse(resource: &str, operation: &str) -> Result<Self> {
        let unknown = || BridgeError::UnknownOperation(operation.to_string());

        match resource.parse::<Resource>()? {
            Resource::Message => {
                let op = match operation {
                    "sendText" => MessageOperation::SendText,
                    "sendImage" => MessageOperation::SendImage,
                    "sendAudio" => MessageOperation::SendAudio,
                    "sendDocument" => MessageOperation::SendDocument,
                    "sendVideo" => MessageOperation::SendVideo,
                    "sendInteractiveList" => MessageOperation::SendInteractiveList,
                    "sendInteractiveButtons" => MessageOperation::SendInteractiveButtons,
                    _ => return Err(unknown()),
                };
                Ok(Self::Message(op))
            }
            Resource::MessageStore => {
                let op = match operation {
                    "getAllMessages" => StoreOperation::GetAllMessages,
                    "getMessagesByPhone" => StoreOperation::GetMessagesByPhone,
                    "saveMessage" => StoreOperation::SaveMessage,
                    "clearMessages" => StoreOperation::ClearMessages,
                    _ => return Err(unknown()),
                };
                Ok(Self::Store(op))
            }
            Resource::Template => match operation {
                "sendTemplate" => Ok(Self::Template(TemplateOperation::SendTemplate)),
                _ => Err(unknown()),
            },
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Self::Message(_) => Resource::Message,
            Self::Store(_) => Resource::MessageStore,
            Self::Template(_) => Resource::Template,
        }
    }
}
