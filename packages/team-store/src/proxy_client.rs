//! HTTP client for the chat proxy's streaming endpoint.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::{ChatStreamEvent, ChatStreamRequest, SseEventParser};

const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("Backend unreachable: {0}")]
    Network(String),

    #[error("Backend returned {status}: {message}")]
    Http { status: u16, message: String },

    /// An `{error}` event from the stream.
    #[error("{0}")]
    Upstream(String),

    #[error("Stream ended before the response completed")]
    Incomplete,
}

pub type EventStream = BoxStream<'static, Result<ChatStreamEvent, ProxyError>>;

/// Where chat turns are sent. Mocked in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn stream_chat(&self, request: ChatStreamRequest) -> Result<EventStream, ProxyError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for `POST /api/chat/stream` and `GET /health`.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http_client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Uses `BACKEND_URL`, falling back to `http://localhost:3000`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `Ok(true)` when the proxy answers `/health` with a 2xx.
    pub async fn health(&self) -> Result<bool, ProxyError> {
        let response = self
            .http_client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ProxyError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }

    /// Stream one turn, calling `on_chunk` per fragment; returns the full reply.
    pub async fn send_message(
        &self,
        request: ChatStreamRequest,
        on_chunk: impl FnMut(&str),
    ) -> Result<String, ProxyError> {
        let events = self.stream_chat(request).await?;
        collect_reply(events, on_chunk).await
    }
}

#[async_trait]
impl ChatBackend for ProxyClient {
    async fn stream_chat(&self, request: ChatStreamRequest) -> Result<EventStream, ProxyError> {
        let url = format!("{}/api/chat/stream", self.base_url);
        debug!(url = %url, agent_id = ?request.agent_id, "Opening chat stream");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat proxy request failed");
                ProxyError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            warn!(status = %status, error = %message, "Chat proxy rejected request");
            return Err(ProxyError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let mut bytes = response.bytes_stream();
        let events = async_stream::stream! {
            let mut parser = SseEventParser::new();
            while let Some(item) = bytes.next().await {
                match item {
                    Ok(chunk) => {
                        for event in parser.push(&chunk) {
                            yield Ok(event);
                        }
                    }
                    Err(e) => {
                        yield Err(ProxyError::Network(e.to_string()));
                        return;
                    }
                }
            }
            for event in parser.finish() {
                yield Ok(event);
            }
        };

        Ok(events.boxed())
    }
}

/// Drive an event stream to its terminal event.
///
/// Fragments go to `on_chunk` in arrival order. `Done` yields its full reply,
/// an `{error}` event becomes [`ProxyError::Upstream`], and a stream that ends
/// without either is [`ProxyError::Incomplete`].
pub async fn collect_reply(
    mut events: EventStream,
    mut on_chunk: impl FnMut(&str),
) -> Result<String, ProxyError> {
    while let Some(event) = events.next().await {
        match event? {
            ChatStreamEvent::Chunk { chunk, .. } => {
                if !chunk.is_empty() {
                    on_chunk(&chunk);
                }
            }
            ChatStreamEvent::Done { full_response } => return Ok(full_response),
            ChatStreamEvent::Error { error } => return Err(ProxyError::Upstream(error)),
        }
    }
    Err(ProxyError::Incomplete)
}
