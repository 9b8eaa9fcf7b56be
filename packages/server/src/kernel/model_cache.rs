//! Per-agent cache of configured models.
//!
//! Keyed by `(agent id, model name)`. A model is built on the first request
//! for an agent, with that request's role and temperature, and reused until
//! it is cleared explicitly.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::debug;

use super::prompts::prompt_for_role;
use super::{BaseChatModel, BaseModelFactory};

type CacheKey = (String, String);

/// Thread-safe, cloneable model cache.
#[derive(Clone, Default)]
pub struct ModelCache {
    models: Arc<RwLock<HashMap<CacheKey, Arc<dyn BaseChatModel>>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached model for the agent, building it if absent.
    pub async fn get_or_create(
        &self,
        agent_id: &str,
        factory: &dyn BaseModelFactory,
        role: &str,
        temperature: f32,
    ) -> Result<Arc<dyn BaseChatModel>> {
        let key = (agent_id.to_string(), factory.model_name().to_string());

        if let Some(model) = self.models.read().await.get(&key) {
            return Ok(Arc::clone(model));
        }

        let mut models = self.models.write().await;
        // Another request may have built it while we waited for the lock
        if let Some(model) = models.get(&key) {
            return Ok(Arc::clone(model));
        }

        let model = factory.create(prompt_for_role(role), temperature)?;
        debug!(agent_id, model = %key.1, role, temperature, "Model created");
        models.insert(key, Arc::clone(&model));
        Ok(model)
    }

    /// Drop every cached model for an agent. Returns how many were removed.
    pub async fn clear(&self, agent_id: &str) -> usize {
        let mut models = self.models.write().await;
        let before = models.len();
        models.retain(|(id, _), _| id != agent_id);
        before - models.len()
    }

    /// Drop all cached models. Returns how many were removed.
    pub async fn clear_all(&self) -> usize {
        let mut models = self.models.write().await;
        let removed = models.len();
        models.clear();
        removed
    }

    pub async fn len(&self) -> usize {
        self.models.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockModelFactory;

    #[tokio::test]
    async fn test_same_handle_until_cleared() {
        let factory = MockModelFactory::new("gemini-test");
        let cache = ModelCache::new();

        let first = cache.get_or_create("1", &factory, "Architect", 0.2).await.unwrap();
        let again = cache.get_or_create("1", &factory, "Data Analyst", 0.9).await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(factory.created().len(), 1);

        let other = cache.get_or_create("2", &factory, "Architect", 0.2).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &other));

        assert_eq!(cache.clear("1").await, 1);
        assert_eq!(cache.clear("1").await, 0);
        let rebuilt = cache.get_or_create("1", &factory, "Architect", 0.2).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));

        assert_eq!(cache.clear_all().await, 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_models_keyed_by_model_name() {
        let cache = ModelCache::new();
        let flash = MockModelFactory::new("flash");
        let pro = MockModelFactory::new("pro");

        cache.get_or_create("1", &flash, "Architect", 0.7).await.unwrap();
        cache.get_or_create("1", &pro, "Architect", 0.7).await.unwrap();
        assert_eq!(cache.len().await, 2);

        assert_eq!(cache.clear("1").await, 2);
    }

    #[tokio::test]
    async fn test_model_built_with_role_prompt() {
        let cache = ModelCache::new();
        let factory = MockModelFactory::new("flash");

        cache.get_or_create("1", &factory, "Architect", 0.4).await.unwrap();
        let created = factory.created();
        assert!(created[0].system_prompt.contains("Solutions Architect"));
        assert_eq!(created[0].temperature, 0.4);
    }
}
