use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::AdapterError;

/// Chat platforms with a webhook adapter.
///
/// ```
/// use amb_core::Platform;
///
/// let p: Platform = "line".parse().unwrap();
/// assert_eq!(p, Platform::Line);
/// assert_eq!(Platform::Facebook.as_str(), "facebook");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Line,
}

impl Platform {
    /// Returns the lowercase tag used by the adapter factory, config variables and telemetry.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Line => "line",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AdapterError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            "line" => Ok(Platform::Line),
            _ => Err(AdapterError::UnsupportedPlatform(tag.to_string())),
        }
    }
}

/// Token used to address a reply to the conversation a [`Message`] came from.
///
/// Facebook hands out a persistent recipient id; LINE a reply token that is valid for a single
/// reply call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RoutingToken {
    Recipient(String),
    ReplyToken(String),
}

impl RoutingToken {
    pub fn as_str(&self) -> &str {
        match self {
            RoutingToken::Recipient(id) => id,
            RoutingToken::ReplyToken(token) => token,
        }
    }
}

impl Default for RoutingToken {
    fn default() -> Self {
        RoutingToken::Recipient(String::new())
    }
}

/// Canonical inbound event produced by every decoder.
///
/// ```
/// use amb_core::{Content, Message, Platform, RoutingToken};
///
/// let msg = Message {
///     platform: Platform::Facebook,
///     sender_id: "123".into(),
///     routing: RoutingToken::Recipient("456".into()),
///     timestamp: 1000,
///     content: Some(Content::Text { text: "hi".into() }),
/// };
/// assert_eq!(msg.routing.as_str(), "456");
/// assert_eq!(msg.text(), Some("hi"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub platform: Platform,
    pub sender_id: String,
    pub routing: RoutingToken,
    /// Platform supplied epoch milliseconds.
    pub timestamp: i64,
    /// `None` for event types the decoder does not map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl Message {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Text { text }) => Some(text),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&str> {
        match &self.content {
            Some(Content::Command { payload }) => Some(payload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Plain text typed by the user.
    Text { text: String },
    /// Shared location.
    Location { lat: f64, lon: f64 },
    /// Postback button press or quick reply selection.
    Command { payload: String },
    Delivery(Receipt),
    Read(Receipt),
    /// Unmodified platform message object (bot echo events).
    Passthrough { raw: Value },
}

/// Delivery and read confirmations share the same shape.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    #[serde(default)]
    pub watermark: i64,
    #[serde(default)]
    pub seq: i64,
}

/// One selectable answer of a question fragment.
///
/// ```
/// use amb_core::Answer;
/// use serde_json::json;
///
/// let answers = Answer::list_from_value(json!([{"title": "Yes", "payload": "YES"}])).unwrap();
/// assert_eq!(answers[0].payload, "YES");
/// assert!(Answer::list_from_value(json!({"title": "nope"})).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub title: String,
    pub payload: String,
}

impl Answer {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }

    /// Validates a dynamically typed answer list.
    pub fn list_from_value(value: Value) -> Result<Vec<Answer>, AdapterError> {
        serde_json::from_value(value).map_err(|source| AdapterError::TypeMismatch {
            expected: "a list of {title, payload} answers",
            source,
        })
    }
}
