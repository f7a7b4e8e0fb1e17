use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::transport::{HttpTransport, TransportRequest, TransportResponse};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("workspace root")
        .to_path_buf()
}

/// Loads a JSON fixture relative to the workspace root.
pub fn load_fixture(path: impl AsRef<Path>) -> Value {
    let full = workspace_root().join(path.as_ref());
    let content = fs::read_to_string(&full)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", full.display()));
    serde_json::from_str(&content)
        .unwrap_or_else(|err| panic!("invalid json in {}: {err}", full.display()))
}

/// Loads a fixture as raw bytes, the way a webhook body arrives.
pub fn load_fixture_bytes(path: impl AsRef<Path>) -> Vec<u8> {
    let full = workspace_root().join(path.as_ref());
    fs::read(&full).unwrap_or_else(|err| panic!("failed to read {}: {err}", full.display()))
}

enum Scripted {
    Respond(TransportResponse),
    Fail(String),
}

/// Transport double that records every request and replays scripted outcomes in order. Once the
/// script runs out every call answers `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<TransportRequest>>,
    script: Mutex<VecDeque<Scripted>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn respond_with(&self, response: TransportResponse) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Respond(response));
    }

    pub async fn fail_with(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.into()));
    }

    pub async fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().await.push(request);
        match self.script.lock().await.pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(anyhow!(message)),
            None => Ok(TransportResponse::ok()),
        }
    }
}
