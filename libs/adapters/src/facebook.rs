//! Messenger ambassador: one Send API call per staged fragment.

use std::sync::Arc;
use std::time::Instant;

use amb_core::{
    AdapterError, Answer, Carousel, DispatchError, Message, Platform, SharedTransport,
    TransportRequest,
};
use amb_translator::facebook::{self as wire, FacebookFragment};
use async_trait::async_trait;
use serde_json::Value;
use tracing::Instrument;

use crate::ambassador::Ambassador;
use crate::config::Credentials;
use crate::egress;
use crate::staging::StagingBuffer;

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";
const SEND_PATH: &str = "/v2.6/me/messages";
const PLATFORM: Platform = Platform::Facebook;

pub struct FacebookAmbassador {
    credentials: Credentials,
    transport: SharedTransport,
    staging: StagingBuffer<FacebookFragment>,
}

impl FacebookAmbassador {
    pub fn new(credentials: Credentials, transport: SharedTransport) -> Self {
        Self {
            credentials,
            transport,
            staging: StagingBuffer::new(),
        }
    }

    /// Appends an already built fragment.
    pub async fn stage(&self, fragment: FacebookFragment) {
        let kind = fragment_kind(&fragment);
        let pending = self.staging.stage(fragment).await;
        egress::record_staged(PLATFORM, kind, pending);
    }

    pub async fn last_sent_fragments(&self) -> Arc<[FacebookFragment]> {
        self.staging.last_sent().await
    }

    /// Answers the `hub.mode=subscribe` handshake with the challenge when the verify token
    /// matches the configured one.
    pub fn verify_subscription(
        &self,
        mode: Option<&str>,
        verify_token: Option<&str>,
        challenge: Option<&str>,
    ) -> Option<String> {
        let expected = self.credentials.verify_token.as_deref()?;
        amb_security::verify_subscription(mode, verify_token, challenge, expected)
    }

    fn send_url(&self) -> String {
        format!(
            "{}{SEND_PATH}?access_token={}",
            self.credentials.api_base_or(DEFAULT_API_BASE),
            self.credentials.token
        )
    }

    /// Posts fragments in order and stops at the first failure. Returns how many were delivered.
    async fn dispatch(
        &self,
        recipient_id: &str,
        batch: &[FacebookFragment],
    ) -> (usize, Result<(), DispatchError>) {
        for (index, fragment) in batch.iter().enumerate() {
            if let Err(err) = self.post(recipient_id, fragment, batch).await {
                return (index, Err(err));
            }
        }
        (batch.len(), Ok(()))
    }

    async fn post(
        &self,
        recipient_id: &str,
        fragment: &FacebookFragment,
        batch: &[FacebookFragment],
    ) -> Result<(), DispatchError> {
        let body = wire::send_body(recipient_id, fragment).map_err(|source| {
            DispatchError::Encode {
                platform: PLATFORM,
                source,
            }
        })?;
        let request = TransportRequest::new(self.send_url(), body);
        tracing::debug!(endpoint = request.endpoint(), "posting fragment");

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

fn fragment_kind(fragment: &FacebookFragment) -> &'static str {
    match fragment {
        FacebookFragment::Text { .. } => "text",
        FacebookFragment::Question { .. } => "question",
        FacebookFragment::Template { .. } => "template",
    }
}

#[async_trait]
impl Ambassador for FacebookAmbassador {
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

    /// Each fragment is its own Send API call. A failed call ends the flush; fragments after it
    /// are dropped along with the rest of the batch.
    async fn send(&self, routing: &str) -> Result<(), DispatchError> {
        let batch = self.staging.take().await;
        let span = egress::send_span(PLATFORM, routing, batch.len());
        async {
            let started = Instant::now();
            let (delivered, result) = self.dispatch(routing, &batch).await;
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
            Some(secret) => amb_security::verify_facebook_signature(secret, signature, body),
            None => false,
        }
    }
}
