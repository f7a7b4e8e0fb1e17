//! Send API payloads for Messenger.

use amb_core::{Answer, Button, ButtonType, Carousel, WebviewHeight};
use serde::Serialize;
use serde_json::Value;

/// Cards beyond this many are dropped from a generic template.
pub const MAX_TEMPLATE_ELEMENTS: usize = 10;

/// The `message` object of one Send API call.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FacebookFragment {
    Text {
        text: String,
    },
    Question {
        text: String,
        quick_replies: Vec<QuickReply>,
    },
    Template {
        attachment: TemplateAttachment,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuickReply {
    pub content_type: &'static str,
    pub title: String,
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateAttachment {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: GenericTemplate,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenericTemplate {
    pub template_type: &'static str,
    pub elements: Vec<GenericElement>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenericElement {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<FacebookButton>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum FacebookButton {
    #[serde(rename = "element_share")]
    Share,
    #[serde(rename = "account_link")]
    AccountLink { url: String },
    #[serde(rename = "web_url")]
    WebUrl {
        title: String,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        webview_height_ratio: Option<WebviewHeight>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        messenger_extensions: bool,
    },
}

pub fn text(text: &str) -> FacebookFragment {
    FacebookFragment::Text {
        text: text.to_string(),
    }
}

/// Text with one quick reply per answer.
///
/// ```
/// use amb_core::Answer;
/// use serde_json::json;
///
/// let fragment = amb_translator::facebook::question("Color?", &[Answer::new("Red", "RED")]);
/// assert_eq!(
///     serde_json::to_value(&fragment).unwrap(),
///     json!({
///         "text": "Color?",
///         "quick_replies": [{"content_type": "text", "title": "Red", "payload": "RED"}]
///     })
/// );
/// ```
pub fn question(text: &str, answers: &[Answer]) -> FacebookFragment {
    FacebookFragment::Question {
        text: text.to_string(),
        quick_replies: answers
            .iter()
            .map(|answer| QuickReply {
                content_type: "text",
                title: answer.title.clone(),
                payload: answer.payload.clone(),
            })
            .collect(),
    }
}

/// Generic template built from the first [`MAX_TEMPLATE_ELEMENTS`] cards.
pub fn carousel(cards: &[Carousel]) -> FacebookFragment {
    let elements = cards
        .iter()
        .take(MAX_TEMPLATE_ELEMENTS)
        .map(|card| GenericElement {
            title: card.title.clone(),
            subtitle: card.text.clone(),
            image_url: card.image_url.clone(),
            item_url: card.item_url.clone(),
            buttons: card.buttons.iter().filter_map(button).collect(),
        })
        .collect();

    FacebookFragment::Template {
        attachment: TemplateAttachment {
            kind: "template",
            payload: GenericTemplate {
                template_type: "generic",
                elements,
            },
        },
    }
}

fn button(btn: &Button) -> Option<FacebookButton> {
    match btn.kind {
        ButtonType::Share => Some(FacebookButton::Share),
        ButtonType::AccountLink => Some(FacebookButton::AccountLink {
            url: btn.data.clone(),
        }),
        ButtonType::Url => Some(FacebookButton::WebUrl {
            title: btn.label.clone(),
            url: btn.data.clone(),
            webview_height_ratio: btn.height_ratio,
            messenger_extensions: btn.extensions,
        }),
        ButtonType::Unsupported => None,
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    recipient: Recipient<'a>,
    message: &'a FacebookFragment,
}

#[derive(Serialize)]
struct Recipient<'a> {
    id: &'a str,
}

/// Body of one Send API call addressed to `recipient_id`.
pub fn send_body(
    recipient_id: &str,
    fragment: &FacebookFragment,
) -> Result<Value, serde_json::Error> {
    serde_json::to_value(SendRequest {
        recipient: Recipient { id: recipient_id },
        message: fragment,
    })
}
