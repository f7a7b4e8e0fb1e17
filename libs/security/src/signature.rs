use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const FACEBOOK_SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const LINE_SIGNATURE_HEADER: &str = "X-Line-Signature";

const SHA256_PREFIX: &str = "sha256=";
const SUBSCRIBE_MODE: &str = "subscribe";

/// Checks a Messenger `X-Hub-Signature-256` header value against `body`.
///
/// ```
/// use hmac::{Hmac, Mac};
/// use sha2::Sha256;
///
/// let body = br#"{"object":"page"}"#;
/// let mut mac = Hmac::<Sha256>::new_from_slice(b"app-secret").unwrap();
/// mac.update(body);
/// let header = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));
/// assert!(amb_security::verify_facebook_signature("app-secret", &header, body));
/// assert!(!amb_security::verify_facebook_signature("other", &header, body));
/// ```
pub fn verify_facebook_signature(app_secret: &str, header: &str, body: &[u8]) -> bool {
    let result = header
        .strip_prefix(SHA256_PREFIX)
        .ok_or_else(|| anyhow!("missing sha256= prefix"))
        .and_then(|sig| hex::decode(sig.trim()).map_err(Into::into))
        .and_then(|provided| hmac_verify(app_secret, body, &provided));
    log_outcome("facebook", result)
}

/// Checks a LINE `X-Line-Signature` header value against `body`.
pub fn verify_line_signature(channel_secret: &str, header: &str, body: &[u8]) -> bool {
    let result = B64
        .decode(header.trim())
        .map_err(Into::into)
        .and_then(|provided| hmac_verify(channel_secret, body, &provided));
    log_outcome("line", result)
}

/// Messenger subscription handshake. Returns the challenge to echo back when `mode` is
/// `subscribe` and the token matches.
pub fn verify_subscription(
    mode: Option<&str>,
    verify_token: Option<&str>,
    challenge: Option<&str>,
    expected: &str,
) -> Option<String> {
    if expected.is_empty() {
        return None;
    }
    if mode == Some(SUBSCRIBE_MODE) && verify_token == Some(expected) {
        Some(challenge.unwrap_or_default().to_string())
    } else {
        tracing::warn!(mode = mode.unwrap_or(""), "webhook subscription rejected");
        None
    }
}

fn hmac_verify(secret: &str, body: &[u8], provided: &[u8]) -> Result<()> {
    if secret.is_empty() {
        return Err(anyhow!("empty secret"));
    }
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(body);
    mac.verify_slice(provided)
        .map_err(|_| anyhow!("bad signature"))
}

fn log_outcome(platform: &'static str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(platform, error = %err, "invalid webhook signature");
            false
        }
    }
}
