use serde_json::{Value, json};

/// Content of an outbound WhatsApp message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text { body: String, preview_url: bool },
    Image { link: String },
    Audio { link: String },
    Document { link: String, caption: String },
    Video { link: String, caption: String },
    InteractiveList {
        header: String,
        body: String,
        footer: String,
        button: String,
        sections: Value,
    },
    InteractiveButtons { body: String, buttons: Value },
}

impl MessageContent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Audio { .. } => "audio",
            Self::Document { .. } => "document",
            Self::Video { .. } => "video",
            Self::InteractiveList { .. } | Self::InteractiveButtons { .. } => "interactive",
        }
    }
}

/// A message addressed to one recipient, sent through `/send-message`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: String,
    pub content: MessageContent,
}

impl OutboundMessage {
    pub fn new(to: impl Into<String>, content: MessageContent) -> Self {
        Self {
            to: to.into(),
            content,
        }
    }

    /// The `messageObject` the wCRM API expects.
    pub fn to_message_object(&self) -> Value {
        let to = &self.to;
        match &self.content {
            MessageContent::Text { body, preview_url } => json!({
                "to": to,
                "type": "text",
                "text": {"preview_url": preview_url, "body": body}
            }),
            MessageContent::Image { link } => json!({
                "to": to,
                "type": "image",
                "image": {"link": link}
            }),
            MessageContent::Audio { link } => json!({
                "to": to,
                "type": "audio",
                "audio": {"link": link}
            }),
            MessageContent::Document { link, caption } => json!({
                "to": to,
                "type": "document",
                "document": {"link": link, "caption": caption}
            }),
            MessageContent::Video { link, caption } => json!({
                "to": to,
                "type": "video",
                "video": {"link": link, "caption": caption}
            }),
            MessageContent::InteractiveList {
                header,
                body,
                footer,
                button,
                sections,
            } => json!({
                "to": to,
                "type": "interactive",
                "interactive": {
                    "type": "list",
                    "header": {"type": "text", "text": header},
                    "body": {"text": body},
                    "footer": {"text": footer},
                    "action": {"button": button, "sections": sections}
                }
            }),
            MessageContent::InteractiveButtons { body, buttons } => json!({
                "to": to,
                "type": "interactive",
                "interactive": {
                    "type": "button",
                    "body": {"text": body},
                    "action": {"buttons": buttons}
                }
            }),
        }
    }

    /// Request body for `/send-message`.
    pub fn to_request_body(&self) -> Value {
        json!({ "messageObject": self.to_message_object() })
    }
}

/// A pre-approved template message, sent through `/send_templet`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMessage {
    pub send_to: String,
    pub template_name: String,
    /// Values for the template placeholders, in order.
    pub variables: Value,
    pub media_uri: Option<String>,
}

impl TemplateMessage {
    pub fn to_request_body(&self) -> Value {
        let mut body = json!({
            "sendTo": self.send_to,
            "templetName": self.template_name,
            "exampleArr": self.variables,
        });
        if let Some(uri) = self.media_uri.as_deref().filter(|uri| !uri.is_empty()) {
            body["mediaUri"] = json!(uri);
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_object() {
        let message = OutboundMessage::new(
            "+15551234567",
            MessageContent::Text {
                body: "Hello".to_string(),
                preview_url: true,
            },
        );
        assert_eq!(
            message.to_request_body(),
            json!({
                "messageObject": {
                    "to": "+15551234567",
                    "type": "text",
                    "text": {"preview_url": true, "body": "Hello"}
                }
            })
        );
    }

    #[test]
    fn test_document_keeps_empty_caption() {
        let message = OutboundMessage::new(
            "+1",
            MessageContent::Document {
                link: "https://example.com/a.pdf".to_string(),
                caption: String::new(),
            },
        );
        assert_eq!(
            message.to_message_object()["document"],
            json!({"link": "https://example.com/a.pdf", "caption": ""})
        );
    }

    #[test]
    fn test_interactive_list_layout() {
        let sections = json!([{"title": "Menu", "rows": [{"id": "r1", "title": "Pizza"}]}]);
        let message = OutboundMessage::new(
            "+1",
            MessageContent::InteractiveList {
                header: "Today".to_string(),
                body: "Pick one".to_string(),
                footer: String::new(),
                button: "Open".to_string(),
                sections: sections.clone(),
            },
        );
        let object = message.to_message_object();

        assert_eq!(object["type"], "interactive");
        assert_eq!(object["interactive"]["type"], "list");
        assert_eq!(object["interactive"]["header"], json!({"type": "text", "text": "Today"}));
        assert_eq!(object["interactive"]["action"]["button"], "Open");
        assert_eq!(object["interactive"]["action"]["sections"], sections);
        assert_eq!(message.content.kind(), "interactive");
    }

    #[test]
    fn test_interactive_buttons_layout() {
        let buttons = json!([{"type": "reply", "reply": {"id": "yes", "title": "Yes"}}]);
        let message = OutboundMessage::new(
            "+1",
            MessageContent::InteractiveButtons {
                body: "Confirm?".to_string(),
                buttons: buttons.clone(),
            },
        );
        assert_eq!(
            message.to_message_object()["interactive"],
            json!({"type": "button", "body": {"text": "Confirm?"}, "action": {"buttons": buttons}})
        );
    }

    #[test]
    fn test_template_body_omits_blank_media() {
        let mut template = TemplateMessage {
            send_to: "+1".to_string(),
            template_name: "order_update".to_string(),
            variables: json!(["42", "shipped"]),
            media_uri: Some(String::new()),
        };
        assert_eq!(
            template.to_request_body(),
            json!({"sendTo": "+1", "templetName": "order_update", "exampleArr": ["42", "shipped"]})
        );

        template.media_uri = Some("https://example.com/p.png".to_string());
        assert_eq!(template.to_request_body()["mediaUri"], "https://example.com/p.png");
    }
}
