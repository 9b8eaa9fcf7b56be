// Team Chat Proxy - API Core
//
// Streams role-specific Gemini replies to the team builder over SSE.
// kernel/ holds the model seam, cache and chat service; server/ holds the
// Axum surface.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
