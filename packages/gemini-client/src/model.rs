//! Generative model handles and chat sessions.
//!
//! A [`GenerativeModel`] bundles a model name with its system instruction and
//! generation config, so it can be built once and reused across requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use gemini_client::{Content, GeminiClient};
//!
//! let model = client
//!     .generative_model("gemini-1.5-flash")
//!     .system_instruction("You are a data analyst")
//!     .temperature(0.3)
//!     .build();
//!
//! let mut chat = model.start_chat(vec![Content::user("Hi"), Content::model("Hello!")]);
//! let mut stream = chat.send_message_stream("Summarise our data").await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.text);
//! }
//! ```

use tracing::debug;

use crate::streaming::GenerateContentStream;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use crate::{GeminiClient, Result};

/// Builder for a [`GenerativeModel`].
pub struct GenerativeModelBuilder {
    client: GeminiClient,
    model: String,
    system_instruction: Option<String>,
    generation_config: GenerationConfig,
}

impl GenerativeModelBuilder {
    pub(crate) fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            system_instruction: None,
            generation_config: GenerationConfig::default(),
        }
    }

    /// Set the system instruction.
    pub fn system_instruction(mut self, prompt: impl Into<String>) -> Self {
        self.system_instruction = Some(prompt.into());
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = Some(temperature);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.generation_config.top_k = Some(top_k);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.generation_config.top_p = Some(top_p);
        self
    }

    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.generation_config.max_output_tokens = Some(max);
        self
    }

    /// Build the model handle.
    pub fn build(self) -> GenerativeModel {
        GenerativeModel {
            client: self.client,
            model: self.model,
            system_instruction: self.system_instruction,
            generation_config: self.generation_config,
        }
    }
}

/// A configured model: name, system instruction and sampling parameters.
#[derive(Clone)]
pub struct GenerativeModel {
    client: GeminiClient,
    model: String,
    system_instruction: Option<String>,
    generation_config: GenerationConfig,
}

impl GenerativeModel {
    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation_config
    }

    /// Start a chat seeded with prior turns.
    pub fn start_chat(&self, history: Vec<Content>) -> ChatSession<'_> {
        ChatSession {
            model: self,
            history,
        }
    }

    /// Single-turn, non-streaming generation.
    pub async fn generate(&self, prompt: impl Into<String>) -> Result<GenerateContentResponse> {
        let request = self.request_for(vec![Content::user(prompt)]);
        self.client.generate_content(&self.model, &request).await
    }

    fn request_for(&self, contents: Vec<Content>) -> GenerateContentRequest {
        let mut request = GenerateContentRequest {
            contents,
            system_instruction: None,
            generation_config: Some(self.generation_config.clone()),
        };
        if let Some(prompt) = &self.system_instruction {
            request = request.system_instruction(prompt.clone());
        }
        request
    }
}

/// A multi-turn conversation against a [`GenerativeModel`].
pub struct ChatSession<'a> {
    model: &'a GenerativeModel,
    history: Vec<Content>,
}

impl<'a> ChatSession<'a> {
    /// Turns recorded so far.
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Send a user turn and stream the reply.
    ///
    /// The user turn is appended to the history immediately; call
    /// [`ChatSession::record_reply`] with the concatenated text once the
    /// stream is drained to keep the history complete.
    pub async fn send_message_stream(
        &mut self,
        message: impl Into<String>,
    ) -> Result<GenerateContentStream> {
        self.history.push(Content::user(message));

        debug!(
            model = %self.model.model,
            turns = self.history.len(),
            "Sending chat turn"
        );

        let request = self.model.request_for(self.history.clone());
        self.model
            .client
            .stream_generate_content(&self.model.model, &request)
            .await
    }

    /// Record the model's reply to the last user turn.
    pub fn record_reply(&mut self, text: impl Into<String>) {
        self.history.push(Content::model(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let model = GeminiClient::new("key")
            .generative_model("gemini-1.5-flash")
            .system_instruction("You are terse")
            .temperature(0.2)
            .max_output_tokens(256)
            .build();

        assert_eq!(model.model_name(), "gemini-1.5-flash");
        assert_eq!(model.system_instruction(), Some("You are terse"));
        assert_eq!(model.generation_config().temperature, Some(0.2));
        assert_eq!(model.generation_config().top_k, Some(40));
        assert_eq!(model.generation_config().max_output_tokens, Some(256));
    }

    #[test]
    fn test_request_carries_history_and_instruction() {
        let model = GeminiClient::new("key")
            .generative_model("gemini-1.5-flash")
            .system_instruction("Prompt")
            .build();

        let request = model.request_for(vec![Content::user("a"), Content::model("b")]);
        assert_eq!(request.contents.len(), 2);
        assert_eq!(
            request.system_instruction.as_ref().map(Content::text),
            Some("Prompt".to_string())
        );
    }

    #[test]
    fn test_chat_session_records_reply() {
        let model = GeminiClient::new("key").generative_model("m").build();
        let mut chat = model.start_chat(vec![Content::user("hi")]);
        chat.record_reply("hello");

        assert_eq!(chat.history().len(), 2);
        assert_eq!(chat.history()[1].role.as_deref(), Some("model"));
    }
}
