//! Server dependencies (using traits for testability)

use std::sync::Arc;

use super::{BaseModelFactory, ModelCache};

/// Dependencies shared by the chat routes.
#[derive(Clone)]
pub struct ServerDeps {
    pub model_factory: Arc<dyn BaseModelFactory>,
    pub model_cache: ModelCache,
}

impl ServerDeps {
    pub fn new(model_factory: Arc<dyn BaseModelFactory>, model_cache: ModelCache) -> Self {
        Self {
            model_factory,
            model_cache,
        }
    }
}
