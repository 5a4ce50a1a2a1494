use super::operation::MessageOperation;
use super::params::ItemParams;
use crate::core::Result;
use crate::outbound::{MessageContent, OutboundMessage, TemplateMessage};

/// Builds the outbound message described by an item's parameters.
pub fn compose_message(operation: MessageOperation, params: ItemParams<'_>) -> Result<OutboundMessage> {
    let to = params.string("to")?;

    let content = match operation {
        MessageOperation::SendText => MessageContent::Text {
            body: params.string("textBody")?,
            preview_url: params.flag("previewUrl")?,
        },
        MessageOperation::SendImage => MessageContent::Image {
            link: params.string("imageUrl")?,
        },
        MessageOperation::SendAudio => MessageContent::Audio {
            link: params.string("audioUrl")?,
        },
        MessageOperation::SendDocument => MessageContent::Document {
            link: params.string("documentUrl")?,
            caption: params.string_or_empty("documentCaption")?,
        },
        MessageOperation::SendVideo => MessageContent::Video {
            link: params.string("videoUrl")?,
            caption: params.string_or_empty("videoCaption")?,
        },
        MessageOperation::SendInteractiveList => MessageContent::InteractiveList {
            header: params.string("listHeaderText")?,
            body: params.string("listBodyText")?,
            footer: params.string_or_empty("listFooterText")?,
            button: params.string("listButtonText")?,
            sections: params.json("listSections", "Invalid JSON in Sections field")?,
        },
        MessageOperation::SendInteractiveButtons => MessageContent::InteractiveButtons {
            body: params.string("buttonBodyText")?,
            buttons: params.json("buttons", "Invalid JSON in Buttons field")?,
        },
    };

    Ok(OutboundMessage::new(to, content))
}

/// Builds the template message described by an item's parameters.
pub fn compose_template(params: ItemParams<'_>) -> Result<TemplateMessage> {
    let send_to = params.string("to")?;
    let template_name = params.string("templateName")?;
    let variables = params.json(
        "templateVariables",
        "Invalid JSON in Template Variables field",
    )?;
    let media_uri = Some(params.string_or_empty("mediaUri")?).filter(|uri| !uri.is_empty());

    Ok(TemplateMessage {
        send_to,
        template_name,
        variables,
        media_uri,
    })
}
