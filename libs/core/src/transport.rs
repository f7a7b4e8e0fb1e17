//! HTTP seam used by the dispatchers. Adapters only ever talk to [`HttpTransport`], so callers
//! can inject their own client (or a recording double in tests).

use anyhow::{Context, Result};
use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub url: String,
    pub bearer: Option<String>,
    pub body: Value,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            bearer: None,
            body,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// URL without its query string; safe to log when the token travels as a query parameter.
    pub fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK, "{}")
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POSTs `request.body` as JSON. Non-2xx statuses are returned as responses, not errors;
    /// `Err` is reserved for failures below HTTP.
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse>;
}

pub type SharedTransport = Arc<dyn HttpTransport>;

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn shared(client: reqwest::Client) -> SharedTransport {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        let response = builder
            .send()
            .await
            // The query string may carry an access token.
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("POST {} failed", request.endpoint()))?;

        let status = response.status();
        tracing::debug!(
            endpoint = request.endpoint(),
            status = status.as_u16(),
            "transport response"
        );
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("reading response from {} failed", request.endpoint()))?;
        Ok(TransportResponse { status, body })
    }
}
