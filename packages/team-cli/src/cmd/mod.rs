//! Command implementations

pub mod agents;
pub mod chat;
pub mod members;
pub mod teams;
