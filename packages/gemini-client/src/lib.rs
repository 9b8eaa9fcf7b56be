//! Pure Gemini / Vertex AI REST client
//!
//! A minimal client for the `generateContent` family of endpoints, with no
//! domain-specific logic. Works against both the Gemini API (API key) and
//! Vertex AI (OAuth access token).
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{Content, GeminiClient, GenerateContentRequest};
//!
//! let client = GeminiClient::from_env()?;
//!
//! let response = client
//!     .generate_content(
//!         "gemini-1.5-flash",
//!         &GenerateContentRequest::new().content(Content::user("Hello!")),
//!     )
//!     .await?;
//! println!("{}", response.text());
//! ```

pub mod error;
pub mod model;
pub mod streaming;
pub mod types;

pub use error::{GeminiError, Result};
pub use model::{ChatSession, GenerativeModel, GenerativeModelBuilder};
pub use streaming::{GenerateContentStream, StreamChunk};
pub use types::*;

use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// How requests are authenticated.
#[derive(Clone)]
enum Auth {
    /// Gemini API key, sent as `x-goog-api-key`
    ApiKey(String),
    /// OAuth access token (Vertex AI), sent as a bearer token
    Bearer(String),
}

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    auth: Auth,
    base_url: String,
}

impl GeminiClient {
    /// Create a Gemini API client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            auth: Auth::ApiKey(api_key.into()),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Create a Vertex AI client for a project and region.
    pub fn vertex(
        project_id: impl AsRef<str>,
        location: impl AsRef<str>,
        access_token: impl Into<String>,
    ) -> Self {
        let location = location.as_ref();
        Self {
            http_client: Client::new(),
            auth: Auth::Bearer(access_token.into()),
            base_url: format!(
                "https://{location}-aiplatform.googleapis.com/v1/projects/{}/locations/{location}/publishers/google",
                project_id.as_ref()
            ),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (proxies, local mocks).
    ///
    /// Model endpoints resolve to `{base_url}/models/{model}:{method}`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start building a reusable model handle.
    pub fn generative_model(&self, model: impl Into<String>) -> GenerativeModelBuilder {
        GenerativeModelBuilder::new(self.clone(), model)
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::ApiKey(key) => builder.header("x-goog-api-key", key),
            Auth::Bearer(token) => builder.bearer_auth(token),
        }
    }

    /// Non-streaming generation.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = std::time::Instant::now();

        let response = self
            .authorize(self.http_client.post(self.endpoint(model, "generateContent")))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(GeminiError::Api(describe_error(status, &error_text)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        if let Some(reason) = body.block_reason() {
            return Err(GeminiError::Api(format!("Prompt blocked: {}", reason)));
        }

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis(),
            "Gemini generateContent"
        );

        Ok(body)
    }

    /// Streaming generation.
    ///
    /// Uses `alt=sse` so each event arrives as a `data:` line.
    pub async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentStream> {
        let url = format!("{}?alt=sse", self.endpoint(model, "streamGenerateContent"));

        let response = self
            .authorize(self.http_client.post(url))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini streaming request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini streaming API error");
            return Err(GeminiError::Api(describe_error(status, &error_text)));
        }

        Ok(GenerateContentStream::new(response.bytes_stream()))
    }
}

/// Prefer the API's own error message over the raw body.
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<types::ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.to_string(),
        Err(_) if body.is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = GeminiClient::new("key-test").with_base_url("http://localhost:9000/v1beta/");

        assert!(matches!(&client.auth, Auth::ApiKey(k) if k == "key-test"));
        assert_eq!(client.base_url(), "http://localhost:9000/v1beta");
        assert_eq!(
            client.endpoint("gemini-1.5-flash", "generateContent"),
            "http://localhost:9000/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_vertex_endpoint() {
        let client = GeminiClient::vertex("my-project", "europe-west4", "token");

        assert!(matches!(&client.auth, Auth::Bearer(_)));
        assert_eq!(
            client.endpoint("gemini-1.5-flash", "streamGenerateContent"),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/my-project/locations/europe-west4/publishers/google/models/gemini-1.5-flash:streamGenerateContent"
        );
    }

    #[test]
    fn test_describe_error_prefers_api_message() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        let message = describe_error(reqwest::StatusCode::FORBIDDEN, body);
        assert_eq!(message, "API key not valid (403 PERMISSION_DENIED)");

        let message = describe_error(reqwest::StatusCode::BAD_GATEWAY, "");
        assert_eq!(message, "HTTP 502 Bad Gateway");
    }
}
