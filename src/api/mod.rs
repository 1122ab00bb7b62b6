//! One module per group of server operations, each adding methods to
//! [`OllamaClient`](crate::client::OllamaClient).

pub mod chat;
pub mod embeddings;
pub mod generate;
pub mod lifecycle;
pub mod models;

pub use chat::{ChatMessage, messages};
