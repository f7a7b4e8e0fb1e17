//! Translation between platform wire shapes and the canonical ambassador model.
//!
//! Each platform module has two halves: `inbound` decodes a webhook body into
//! [`amb_core::Message`]s, `outbound` builds the typed fragments a caller stages for a reply and
//! the request bodies the dispatcher posts.

mod de;
pub mod telemetry;

pub mod facebook;
pub mod line;

use amb_core::{DecodeError, Message, Platform};

/// Decodes a webhook body for `platform`.
///
/// ```
/// use amb_core::Platform;
///
/// let body = br#"{"events":[{"type":"postback","replyToken":"r","timestamp":1,"source":{"userId":"U1"},"postback":{"data":"buy_1"}}]}"#;
/// let messages = amb_translator::translate(Platform::Line, body).unwrap();
/// assert_eq!(messages[0].command(), Some("buy_1"));
/// ```
pub fn translate(platform: Platform, body: &[u8]) -> Result<Vec<Message>, DecodeError> {
    match platform {
        Platform::Facebook => facebook::decode(body),
        Platform::Line => line::decode(body),
    }
}

/// Reader based variant of [`translate`].
pub fn translate_reader<R: std::io::Read>(
    platform: Platform,
    reader: R,
) -> Result<Vec<Message>, DecodeError> {
    match platform {
        Platform::Facebook => facebook::decode_reader(reader),
        Platform::Line => line::decode_reader(reader),
    }
}
