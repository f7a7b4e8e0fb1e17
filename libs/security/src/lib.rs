//! Inbound webhook authentication.
//!
//! Messenger signs bodies with `X-Hub-Signature-256: sha256=<hex>` and LINE with
//! `X-Line-Signature: <base64>`; both are HMAC-SHA256 over the raw body keyed by the app or
//! channel secret.

mod signature;

pub use signature::{
    FACEBOOK_SIGNATURE_HEADER, LINE_SIGNATURE_HEADER, verify_facebook_signature,
    verify_line_signature, verify_subscription,
};
