//! Messenger Platform webhook decoding.

use std::io::Read;

use amb_core::{Content, DecodeError, Message, Platform, Receipt, RoutingToken};
use serde::Deserialize;
use serde_json::Value;

use crate::de::{null_as_default, string_or_number};
use crate::telemetry::translate_with_span;

#[derive(Debug, Deserialize)]
struct WebhookObject {
    #[serde(default, deserialize_with = "null_as_default")]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default, deserialize_with = "null_as_default")]
    messaging: Vec<Event>,
}

#[derive(Debug, Default, Deserialize)]
struct Party {
    #[serde(default, deserialize_with = "string_or_number")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(default, deserialize_with = "null_as_default")]
    sender: Party,
    #[serde(default, deserialize_with = "null_as_default")]
    recipient: Party,
    #[serde(default, deserialize_with = "null_as_default")]
    timestamp: i64,
    // Kept raw so echo events can be handed back untouched.
    message: Option<Value>,
    delivery: Option<Receipt>,
    postback: Option<Postback>,
    read: Option<Receipt>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default, deserialize_with = "null_as_default")]
    text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    is_echo: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    attachments: Vec<Attachment>,
    quick_reply: Option<QuickReplyPayload>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    kind: AttachmentType,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AttachmentType {
    Location,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct LocationPayload {
    coordinates: Coordinates,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    lat: f64,
    long: f64,
}

#[derive(Debug, Deserialize)]
struct QuickReplyPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    payload: String,
}

#[derive(Debug, Deserialize)]
struct Postback {
    #[serde(default, deserialize_with = "null_as_default")]
    payload: String,
}

/// Decodes a Messenger webhook body into one [`Message`] per `messaging` event, in order.
///
/// ```
/// let body = br#"{"entry":[{"messaging":[{"sender":{"id":"123"},"recipient":{"id":"456"},"timestamp":1000,"message":{"text":"hi"}}]}]}"#;
/// let messages = amb_translator::facebook::decode(body).unwrap();
/// assert_eq!(messages.len(), 1);
/// assert_eq!(messages[0].sender_id, "123");
/// assert_eq!(messages[0].text(), Some("hi"));
/// ```
pub fn decode(body: &[u8]) -> Result<Vec<Message>, DecodeError> {
    translate_with_span(Platform::Facebook, || {
        let object: WebhookObject = serde_json::from_slice(body)
            .map_err(|err| DecodeError::new(Platform::Facebook, "envelope", err))?;
        decode_object(object)
    })
}

pub fn decode_reader<R: Read>(reader: R) -> Result<Vec<Message>, DecodeError> {
    translate_with_span(Platform::Facebook, || {
        let object: WebhookObject = serde_json::from_reader(reader)
            .map_err(|err| DecodeError::new(Platform::Facebook, "envelope", err))?;
        decode_object(object)
    })
}

fn decode_object(object: WebhookObject) -> Result<Vec<Message>, DecodeError> {
    let mut messages = Vec::new();
    for entry in object.entry {
        for event in entry.messaging {
            messages.push(decode_event(event)?);
        }
    }
    Ok(messages)
}

fn decode_event(event: Event) -> Result<Message, DecodeError> {
    let content = if let Some(raw) = event.message {
        Some(message_content(raw)?)
    } else if let Some(delivery) = event.delivery {
        Some(Content::Delivery(delivery))
    } else if let Some(postback) = event.postback {
        Some(Content::Command {
            payload: postback.payload,
        })
    } else {
        event.read.map(Content::Read)
    };

    Ok(Message {
        platform: Platform::Facebook,
        sender_id: event.sender.id,
        routing: RoutingToken::Recipient(event.recipient.id),
        timestamp: event.timestamp,
        content,
    })
}

fn message_content(raw: Value) -> Result<Content, DecodeError> {
    let body = MessageBody::deserialize(&raw)
        .map_err(|err| DecodeError::new(Platform::Facebook, "message", err))?;

    if let Some(first) = body.attachments.first() {
        if first.kind == AttachmentType::Location {
            let location = LocationPayload::deserialize(&first.payload)
                .map_err(|err| DecodeError::new(Platform::Facebook, "location attachment", err))?;
            return Ok(Content::Location {
                lat: location.coordinates.lat,
                lon: location.coordinates.long,
            });
        }
        // Images, files, fallbacks: the caller gets the platform object as-is.
        return Ok(Content::Passthrough { raw });
    }

    if let Some(quick_reply) = body.quick_reply {
        return Ok(Content::Command {
            payload: quick_reply.payload,
        });
    }

    if body.is_echo {
        return Ok(Content::Passthrough { raw });
    }

    Ok(Content::Text { text: body.text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_value(value: Value) -> Result<Vec<Message>, DecodeError> {
        decode(value.to_string().as_bytes())
    }

    fn single_event(event: Value) -> Message {
        let mut messages = decode_value(json!({
            "object": "page",
            "entry": [{"id": "p1", "time": 1, "messaging": [event]}]
        }))
        .unwrap();
        assert_eq!(messages.len(), 1);
        messages.remove(0)
    }

    #[test]
    fn text_message() {
        let msg = single_event(json!({
            "sender": {"id": "123"},
            "recipient": {"id": "456"},
            "timestamp": 1000,
            "message": {"mid": "m1", "text": "hi"}
        }));
        assert_eq!(msg.sender_id, "123");
        assert_eq!(msg.routing, RoutingToken::Recipient("456".into()));
        assert_eq!(msg.timestamp, 1000);
        assert_eq!(msg.content, Some(Content::Text { text: "hi".into() }));
    }

    #[test]
    fn numeric_ids_are_normalized_to_strings() {
        let msg = single_event(json!({
            "sender": {"id": 1254459154682919u64},
            "recipient": {"id": 682498302938465u64},
            "timestamp": 1,
            "message": {"text": "x"}
        }));
        assert_eq!(msg.sender_id, "1254459154682919");
        assert_eq!(msg.routing.as_str(), "682498302938465");
    }

    #[test]
    fn location_attachment() {
        let msg = single_event(json!({
            "sender": {"id": "1"},
            "recipient": {"id": "2"},
            "timestamp": 3,
            "message": {
                "attachments": [{
                    "type": "location",
                    "payload": {"coordinates": {"lat": 25.03, "long": 121.56}}
                }]
            }
        }));
        assert_eq!(
            msg.content,
            Some(Content::Location {
                lat: 25.03,
                lon: 121.56
            })
        );
    }

    #[test]
    fn malformed_location_aborts_whole_call() {
        let err = decode_value(json!({
            "entry": [{"messaging": [
                {"sender": {"id": "1"}, "recipient": {"id": "2"}, "timestamp": 1, "message": {"text": "ok"}},
                {"sender": {"id": "1"}, "recipient": {"id": "2"}, "timestamp": 2,
                 "message": {"attachments": [{"type": "location", "payload": {"url": "x"}}]}}
            ]}]
        }))
        .unwrap_err();
        assert_eq!(err.part, "location attachment");
        assert_eq!(err.platform, Platform::Facebook);
    }

    #[test]
    fn quick_reply_outranks_echo() {
        let msg = single_event(json!({
            "sender": {"id": "1"},
            "recipient": {"id": "2"},
            "timestamp": 1,
            "message": {
                "is_echo": true,
                "text": "Red",
                "quick_reply": {"payload": "PICK_RED"}
            }
        }));
        assert_eq!(
            msg.content,
            Some(Content::Command {
                payload: "PICK_RED".into()
            })
        );
    }

    #[test]
    fn echo_passes_raw_message_through() {
        let raw = json!({"is_echo": true, "app_id": 1517776481860111u64, "mid": "m2", "text": "sent"});
        let msg = single_event(json!({
            "sender": {"id": "page"},
            "recipient": {"id": "user"},
            "timestamp": 1,
            "message": raw.clone()
        }));
        assert_eq!(msg.content, Some(Content::Passthrough { raw }));
    }

    #[test]
    fn delivery_postback_and_read() {
        let messages = decode_value(json!({
            "entry": [{"messaging": [
                {"sender": {"id": "1"}, "recipient": {"id": "2"}, "timestamp": 1,
                 "delivery": {"mids": ["m1"], "watermark": 1458668856253i64, "seq": 37}},
                {"sender": {"id": "1"}, "recipient": {"id": "2"}, "timestamp": 2,
                 "postback": {"title": "Buy", "payload": "BUY_1"}},
                {"sender": {"id": "1"}, "recipient": {"id": "2"}, "timestamp": 3,
                 "read": {"watermark": 1458668856253i64}}
            ]}]
        }))
        .unwrap();
        assert_eq!(
            messages[0].content,
            Some(Content::Delivery(Receipt {
                watermark: 1458668856253,
                seq: 37
            }))
        );
        assert_eq!(messages[1].command(), Some("BUY_1"));
        assert_eq!(
            messages[2].content,
            Some(Content::Read(Receipt {
                watermark: 1458668856253,
                seq: 0
            }))
        );
    }

    #[test]
    fn unknown_event_keeps_envelope() {
        let msg = single_event(json!({
            "sender": {"id": "9"},
            "recipient": {"id": "8"},
            "timestamp": 77,
            "optin": {"ref": "promo"}
        }));
        assert_eq!(msg.sender_id, "9");
        assert_eq!(msg.routing.as_str(), "8");
        assert_eq!(msg.timestamp, 77);
        assert!(msg.content.is_none());
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let messages = decode_value(json!({
            "entry": [{"messaging": [
                {"sender": {"id": "1"}, "recipient": {"id": "2"}, "timestamp": null,
                 "message": {"text": null, "attachments": null, "is_echo": null}},
                {"sender": null, "recipient": {"id": "2"}, "timestamp": 2,
                 "postback": {"payload": null}},
                {"sender": {"id": "1"}, "recipient": {"id": "2"}, "timestamp": 3,
                 "message": {"text": "still here"}}
            ]}]
        }))
        .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, Some(Content::Text { text: String::new() }));
        assert_eq!(messages[0].timestamp, 0);
        assert_eq!(messages[1].command(), Some(""));
        assert!(messages[1].sender_id.is_empty());
        assert_eq!(messages[2].text(), Some("still here"));
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        let err = decode(b"{\"entry\": \"nope\"}").unwrap_err();
        assert_eq!(err.part, "envelope");
        assert!(decode(b"not json").is_err());
    }

    #[test]
    fn reader_entry_point_matches_slice() {
        let body = br#"{"entry":[{"messaging":[{"sender":{"id":"1"},"recipient":{"id":"2"},"timestamp":5,"message":{"text":"yo"}}]}]}"#;
        let from_reader = decode_reader(&body[..]).unwrap();
        assert_eq!(from_reader, decode(body).unwrap());
    }
}
