// HTTP routes
pub mod chat;
pub mod health;
pub mod models;

pub use chat::*;
pub use health::*;
pub use models::*;
