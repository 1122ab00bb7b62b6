//! Client for the Ollama HTTP API.
//!
//! Responses that arrive as a run of JSON objects (generate, chat and pull
//! progress) are decoded incrementally: each object reaches the registered
//! sink as soon as its closing brace is received, however the bytes were
//! split across network reads.

pub mod api;
pub mod client;
pub mod config;
pub mod constants;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod logging;
pub mod streaming;

#[cfg(test)]
mod tests;

pub use api::{ChatMessage, messages};
pub use client::OllamaClient;
pub use config::ClientConfig;
pub use endpoints::Endpoint;
pub use error::{ClientError, Result};
pub use http::{HttpTransport, Options, OutgoingPayload, PayloadRetention, Transport};
pub use streaming::{DecodeErrorPolicy, DecodedEvent, DecoderOptions, EventSink, ScanMode};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
