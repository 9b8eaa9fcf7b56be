//! Gemini-backed implementations of the model traits.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use gemini_client::{Content, GeminiClient, GenerativeModel};

use super::{BaseChatModel, BaseModelFactory, TextStream};
use crate::config::GeminiAuth;

const TOP_K: u32 = 40;
const TOP_P: f32 = 0.95;
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Builds [`GeminiChatModel`]s for one model name.
pub struct GeminiModelFactory {
    client: GeminiClient,
    model_name: String,
}

impl GeminiModelFactory {
    pub fn new(client: GeminiClient, model_name: impl Into<String>) -> Self {
        Self {
            client,
            model_name: model_name.into(),
        }
    }

    pub fn from_auth(auth: &GeminiAuth, model_name: impl Into<String>) -> Self {
        let client = match auth {
            GeminiAuth::ApiKey(key) => GeminiClient::new(key.clone()),
            GeminiAuth::Vertex {
                project_id,
                location,
                access_token,
            } => GeminiClient::vertex(project_id, location, access_token.clone()),
        };
        Self::new(client, model_name)
    }
}

impl BaseModelFactory for GeminiModelFactory {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn create(&self, system_prompt: &str, temperature: f32) -> Result<Arc<dyn BaseChatModel>> {
        let model = self
            .client
            .generative_model(self.model_name.clone())
            .system_instruction(system_prompt)
            .temperature(temperature)
            .top_k(TOP_K)
            .top_p(TOP_P)
            .max_output_tokens(MAX_OUTPUT_TOKENS)
            .build();

        Ok(Arc::new(GeminiChatModel { model }))
    }
}

/// A cached, configured Gemini model.
pub struct GeminiChatModel {
    model: GenerativeModel,
}

#[async_trait]
impl BaseChatModel for GeminiChatModel {
    async fn stream_reply(&self, history: Vec<Content>, message: &str) -> Result<TextStream> {
        let mut chat = self.model.start_chat(history);
        let stream = chat
            .send_message_stream(message)
            .await
            .map_err(|e| anyhow!("Gemini request failed: {}", e))?;

        Ok(stream
            .map(|item| {
                item.map(|chunk| chunk.text)
                    .map_err(|e| anyhow!("Gemini request failed: {}", e))
            })
            .boxed())
    }
}
