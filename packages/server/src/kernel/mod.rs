//! Kernel module - server infrastructure and dependencies.

pub mod chat_service;
pub mod deps;
pub mod gemini;
pub mod model_cache;
pub mod prompts;
pub mod test_dependencies;
pub mod traits;

pub use chat_service::{history_to_contents, stream_chat};
pub use deps::ServerDeps;
pub use gemini::{GeminiChatModel, GeminiModelFactory};
pub use model_cache::ModelCache;
pub use prompts::prompt_for_role;
pub use test_dependencies::MockModelFactory;
pub use traits::*;
