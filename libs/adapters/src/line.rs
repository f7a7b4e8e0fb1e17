//! LINE ambassador: the whole batch goes out in one reply call.

use std::sync::Arc;
use std::time::Instant;

use amb_core::{
    AdapterError, Answer, Carousel, DispatchError, Message, Platform, SharedTransport,
    TransportRequest,
};
use amb_translator::line::{self as wire, LineFragment};
use async_trait::async_trait;
use serde_json::Value;
use tracing::Instrument;

use crate::ambassador::Ambassador;
use crate::config::Credentials;
use crate::egress;
use crate::staging::StagingBuffer;

pub const DEFAULT_API_BASE: &str = "https://api.line.me";
const REPLY_PATH: &str = "/v2/bot/message/reply";
const PLATFORM: Platform = Platform::Line;

pub struct LineAmbassador {
    credentials: Credentials,
    transport: SharedTransport,
    staging: StagingBuffer<LineFragment>,
}

impl LineAmbassador {
    pub fn new(credentials: Credentials, transport: SharedTransport) -> Self {
        Self {
            credentials,
            transport,
            staging: StagingBuffer::new(),
        }
    }

    pub async fn stage(&self, fragment: LineFragment) {
        let kind = match &fragment {
            LineFragment::Text { .. } => "text",
            LineFragment::Template { .. } => "template",
        };
        let pending = self.staging.stage(fragment).await;
        egress::record_staged(PLATFORM, kind, pending);
    }

    pub async fn last_sent_fragments(&self) -> Arc<[LineFragment]> {
        self.staging.last_sent().await
    }

    async fn dispatch(
        &self,
        reply_token: &str,
        batch: &[LineFragment],
    ) -> Result<(), DispatchError> {
        let body = wire::reply_body(reply_token, batch).map_err(|source| DispatchError::Encode {
            platform: PLATFORM,
            source,
        })?;
        let url = format!(
            "{}{REPLY_PATH}",
            self.credentials.api_base_or(DEFAULT_API_BASE)
        );
        let request = TransportRequest::new(url, body).with_bearer(self.credentials.token.as_str());
        tracing::debug!(endpoint = request.endpoint(), "posting reply");

        match self.transport.post_json(request).await {
            Ok(response) if response.status.is_success() => Ok(()),
            Ok(response) => Err(DispatchError::Remote {
                platform: PLATFORM,
                status: response.status,
                body: response.body,
                pending: egress::pending_json(batch),
            }),
            Err(source) => Err(DispatchError::Transport {
                platform: PLATFORM,
                pending: egress::pending_json(batch),
                source,
            }),
        }
    }
}

#[async_trait]
impl Ambassador for LineAmbassador {
    fn platform(&self) -> Platform {
        PLATFORM
    }

    fn translate(&self, body: &[u8]) -> Result<Vec<Message>, AdapterError> {
        Ok(wire::decode(body)?)
    }

    async fn ask_question(&self, text: &str, answers: &[Answer]) {
        self.stage(wire::question(text, answers)).await;
    }

    async fn send_text(&self, text: &str) {
        self.stage(wire::text(text)).await;
    }

    async fn send_template(&self, elements: Value) -> Result<(), AdapterError> {
        let cards = Carousel::list_from_value(elements)?;
        self.stage(wire::carousel(&cards)).await;
        Ok(())
    }

    /// One reply call for the whole batch; an empty batch makes no call. Reply tokens are single
    /// use, so a failed batch cannot be retried with the same token anyway.
    async fn send(&self, routing: &str) -> Result<(), DispatchError> {
        let batch = self.staging.take().await;
        let span = egress::send_span(PLATFORM, routing, batch.len());
        async {
            let started = Instant::now();
            let result = if batch.is_empty() {
                Ok(())
            } else {
                self.dispatch(routing, &batch).await
            };
            let delivered = if result.is_ok() { batch.len() } else { 0 };
            egress::record_outcome(PLATFORM, delivered, started, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn last_sent(&self) -> Vec<Value> {
        egress::history_values(&self.staging.last_sent().await)
    }

    async fn pending_len(&self) -> usize {
        self.staging.len().await
    }

    fn verify_webhook(&self, signature: &str, body: &[u8]) -> bool {
        match self.credentials.app_secret.as_deref() {
            Some(secret) => amb_security::verify_line_signature(secret, signature, body),
            None => false,
        }
    }
}
