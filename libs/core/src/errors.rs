use http::StatusCode;
use thiserror::Error;

use crate::types::Platform;

/// Malformed inbound webhook. Decoding is all-or-nothing, so no messages accompany this error.
#[derive(Debug, Error)]
#[error("malformed {platform} webhook {part}")]
pub struct DecodeError {
    pub platform: Platform,
    pub part: &'static str,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    pub fn new(platform: Platform, part: &'static str, source: serde_json::Error) -> Self {
        Self {
            platform,
            part,
            source,
        }
    }
}

/// Failure while flushing a staged batch. `pending` is the serialized batch that was being
/// dispatched; it has already been discarded from the staging buffer.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{platform} rejected the message. status: {status}, body: {body}, pending: {pending}")]
    Remote {
        platform: Platform,
        status: StatusCode,
        body: String,
        pending: String,
    },
    #[error("{platform} transport error, pending: {pending}")]
    Transport {
        platform: Platform,
        pending: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to encode {platform} payload")]
    Encode {
        platform: Platform,
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DispatchError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&str> {
        match self {
            DispatchError::Remote { pending, .. } | DispatchError::Transport { pending, .. } => {
                Some(pending)
            }
            DispatchError::Encode { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The caller handed a staging call a value of the wrong shape; nothing was staged.
    #[error("type mismatch: expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
}
