// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Prompt selection, history translation and event framing live in the
// chat service, which only sees these traits.
//
// Naming convention: Base* for trait names (e.g., BaseChatModel)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use gemini_client::Content;

/// Text fragments of one streamed reply, in arrival order.
pub type TextStream = BoxStream<'static, Result<String>>;

// =============================================================================
// Chat Model Trait (Infrastructure - one configured model)
// =============================================================================

#[async_trait]
pub trait BaseChatModel: Send + Sync {
    /// Start a chat seeded with `history` and stream the reply to `message`.
    async fn stream_reply(&self, history: Vec<Content>, message: &str) -> Result<TextStream>;
}

// =============================================================================
// Model Factory Trait (Infrastructure - builds models per agent)
// =============================================================================

pub trait BaseModelFactory: Send + Sync {
    /// Name of the model every handle is built for (part of the cache key).
    fn model_name(&self) -> &str;

    /// Build a model with the given system prompt and temperature.
    fn create(&self, system_prompt: &str, temperature: f32) -> Result<Arc<dyn BaseChatModel>>;
}
