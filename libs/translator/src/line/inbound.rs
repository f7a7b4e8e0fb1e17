//! Messaging API webhook decoding.

use std::io::Read;

use amb_core::{Content, DecodeError, Message, Platform, RoutingToken};
use serde::Deserialize;

use crate::de::null_as_default;
use crate::telemetry::translate_with_span;

#[derive(Debug, Deserialize)]
struct WebhookObject {
    #[serde(default, deserialize_with = "null_as_default")]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    kind: EventType,
    #[serde(default, deserialize_with = "null_as_default")]
    reply_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    source: Source,
    message: Option<EventMessage>,
    postback: Option<Postback>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EventType {
    Message,
    Postback,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Source {
    // Missing for some group events.
    #[serde(default, deserialize_with = "null_as_default")]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct EventMessage {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    kind: MessageType,
    #[serde(default, deserialize_with = "null_as_default")]
    text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    longitude: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MessageType {
    Text,
    Location,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Postback {
    #[serde(default, deserialize_with = "null_as_default")]
    data: String,
}

/// Decodes a LINE webhook body into one [`Message`] per event, in order.
///
/// ```
/// let body = br#"{"events":[{"type":"message","replyToken":"r1","timestamp":1,"source":{"type":"user","userId":"U1"},"message":{"id":"1","type":"text","text":"hi"}}]}"#;
/// let messages = amb_translator::line::decode(body).unwrap();
/// assert_eq!(messages[0].routing.as_str(), "r1");
/// assert_eq!(messages[0].text(), Some("hi"));
/// ```
pub fn decode(body: &[u8]) -> Result<Vec<Message>, DecodeError> {
    translate_with_span(Platform::Line, || {
        let object: WebhookObject = serde_json::from_slice(body)
            .map_err(|err| DecodeError::new(Platform::Line, "envelope", err))?;
        Ok(object.events.into_iter().map(decode_event).collect())
    })
}

pub fn decode_reader<R: Read>(reader: R) -> Result<Vec<Message>, DecodeError> {
    translate_with_span(Platform::Line, || {
        let object: WebhookObject = serde_json::from_reader(reader)
            .map_err(|err| DecodeError::new(Platform::Line, "envelope", err))?;
        Ok(object.events.into_iter().map(decode_event).collect())
    })
}

fn decode_event(event: Event) -> Message {
    let content = match event.kind {
        EventType::Message => event.message.and_then(|message| match message.kind {
            MessageType::Text => Some(Content::Text { text: message.text }),
            MessageType::Location => Some(Content::Location {
                lat: message.latitude,
                lon: message.longitude,
            }),
            MessageType::Other => None,
        }),
        EventType::Postback => Some(Content::Command {
            payload: event.postback.map(|p| p.data).unwrap_or_default(),
        }),
        EventType::Other => None,
    };

    Message {
        platform: Platform::Line,
        sender_id: event.source.user_id,
        routing: RoutingToken::ReplyToken(event.reply_token),
        timestamp: event.timestamp,
        content,
    }
}
