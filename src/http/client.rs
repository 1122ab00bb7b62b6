use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Method;
use serde_json::Value;

use crate::constants::CONTENT_TYPE_JSON;
use crate::error::{ClientError, Result};
use crate::http::error::map_reqwest_error;
use crate::http::parsing::extract_error_message;

/// Response body delivered chunk by chunk; ends when the server closes it.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// Performs the HTTP exchange for the client.
pub trait Transport: Send + Sync {
    /// Sends the request and buffers the entire response body.
    fn send(&self, request: TransportRequest) -> impl Future<Output = Result<Bytes>> + Send;

    /// Sends the request and hands back the body as it arrives.
    fn send_streaming(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<ByteStream>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { client, timeout })
    }

    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn execute(
        &self,
        request: TransportRequest,
        whole_body_timeout: bool,
    ) -> Result<reqwest::Response> {
        let mut request_builder = self.client.request(request.method, &request.url);

        if let Some(body) = request.body {
            request_builder = request_builder
                .header("Content-Type", CONTENT_TYPE_JSON)
                .json(&body);
        }

        // Streams may legitimately run longer than the timeout; they are
        // bounded per chunk by the caller instead.
        if whole_body_timeout {
            request_builder = request_builder.timeout(self.timeout);
        }

        let response = request_builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Ollama server error: {}", status));
        log::error!("HTTP {} from {}: {}", status.as_u16(), request.url, message);

        Err(ClientError::status(status.as_u16(), &message))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<Bytes> {
        let response = self.execute(request, true).await?;
        response.bytes().await.map_err(map_reqwest_error)
    }

    async fn send_streaming(&self, request: TransportRequest) -> Result<ByteStream> {
        let response = self.execute(request, false).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error));

        Ok(Box::pin(stream))
    }
}
