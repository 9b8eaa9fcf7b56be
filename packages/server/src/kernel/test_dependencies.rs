// TestDependencies - mock implementations for testing
//
// Provides a scripted model factory that can be injected into ServerDeps
// for tests. Every model it builds replays the same script and records
// what it was asked.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use gemini_client::Content;
use std::sync::{Arc, Mutex};

use super::{BaseChatModel, BaseModelFactory, ModelCache, ServerDeps, TextStream};

// =============================================================================
// Mock Model Factory
// =============================================================================

/// One step of a scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Chunk(String),
    Fail(String),
}

/// Arguments captured when a model is built
#[derive(Debug, Clone)]
pub struct CreatedModel {
    pub system_prompt: String,
    pub temperature: f32,
}

/// Arguments captured from a stream_reply call
#[derive(Debug, Clone)]
pub struct ReplyCall {
    pub history: Vec<Content>,
    pub message: String,
}

#[derive(Clone)]
pub struct MockModelFactory {
    model_name: String,
    script: Arc<Mutex<Vec<ScriptStep>>>,
    open_error: Arc<Mutex<Option<String>>>,
    created: Arc<Mutex<Vec<CreatedModel>>>,
    calls: Arc<Mutex<Vec<ReplyCall>>>,
}

impl MockModelFactory {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            script: Arc::new(Mutex::new(Vec::new())),
            open_error: Arc::new(Mutex::new(None)),
            created: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with these fragments, in order
    pub fn with_chunks(self, chunks: &[&str]) -> Self {
        self.script
            .lock()
            .unwrap()
            .extend(chunks.iter().map(|c| ScriptStep::Chunk(c.to_string())));
        self
    }

    /// Fail mid-stream after any chunks added so far
    pub fn with_stream_error(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push(ScriptStep::Fail(message.to_string()));
        self
    }

    /// Fail before any fragment is produced
    pub fn with_open_error(self, message: &str) -> Self {
        *self.open_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Get every model built so far
    pub fn created(&self) -> Vec<CreatedModel> {
        self.created.lock().unwrap().clone()
    }

    /// Get every stream_reply call so far
    pub fn calls(&self) -> Vec<ReplyCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Wrap in ServerDeps with an empty cache
    pub fn into_deps(self) -> ServerDeps {
        ServerDeps::new(Arc::new(self), ModelCache::new())
    }
}

impl BaseModelFactory for MockModelFactory {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn create(&self, system_prompt: &str, temperature: f32) -> Result<Arc<dyn BaseChatModel>> {
        self.created.lock().unwrap().push(CreatedModel {
            system_prompt: system_prompt.to_string(),
            temperature,
        });
        Ok(Arc::new(MockChatModel {
            factory: self.clone(),
        }))
    }
}

struct MockChatModel {
    factory: MockModelFactory,
}

#[async_trait]
impl BaseChatModel for MockChatModel {
    async fn stream_reply(&self, history: Vec<Content>, message: &str) -> Result<TextStream> {
        // Record the call
        self.factory.calls.lock().unwrap().push(ReplyCall {
            history,
            message: message.to_string(),
        });

        if let Some(error) = self.factory.open_error.lock().unwrap().clone() {
            return Err(anyhow!(error));
        }

        let steps = self.factory.script.lock().unwrap().clone();
        Ok(stream::iter(steps.into_iter().map(|step| match step {
            ScriptStep::Chunk(text) => Ok(text),
            ScriptStep::Fail(message) => Err(anyhow!(message)),
        }))
        .boxed())
    }
}
