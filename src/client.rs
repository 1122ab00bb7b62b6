use std::time::{Duration, Instant};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::check_cancelled;
use crate::config::{ClientConfig, validate_base_url, validate_config};
use crate::constants::{LOG_PREFIX_ERROR, LOG_PREFIX_SUCCESS, LOG_PREFIX_WARNING};
use crate::endpoints::{Endpoint, endpoint_url};
use crate::error::Result;
use crate::http::request::{Options, OutgoingPayload, PayloadRetention, RequestBuilder};
use crate::http::response::{StreamStats, read_buffered, read_streamed};
use crate::http::{HttpTransport, Transport, TransportRequest};
use crate::logging::{log_payload, log_request, log_timed};
use crate::streaming::{DecoderOptions, EventSink};

/// Client for the Ollama HTTP API.
///
/// Each operation builds its payload from the fluent request state, sends it,
/// and decodes the answer. With a sink registered the body is streamed and
/// every JSON object is handed to the sink as soon as it is complete.
pub struct OllamaClient<T: Transport = HttpTransport> {
    transport: T,
    request: RequestBuilder,
    sink: Option<Box<dyn EventSink + Send>>,
    decoder_options: DecoderOptions,
    timeout: Duration,
    cancellation_token: CancellationToken,
    last_stream: Option<StreamStats>,
}

impl OllamaClient<HttpTransport> {
    pub fn new(base_url: &str, model: Option<&str>) -> Result<Self> {
        Self::from_config(ClientConfig::new(base_url, model))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_seconds))?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> OllamaClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        validate_config(&config)?;

        Ok(Self {
            transport,
            request: RequestBuilder::from_config(&config),
            sink: None,
            decoder_options: config.decoder,
            timeout: Duration::from_secs(config.timeout_seconds),
            cancellation_token: CancellationToken::new(),
            last_stream: None,
        })
    }

    pub fn base_url(&mut self, base_url: &str) -> &mut Self {
        self.request.base_url(base_url);
        self
    }

    pub fn model(&mut self, model: &str) -> &mut Self {
        self.request.model(model);
        self
    }

    pub fn prompt(&mut self, prompt: &str) -> &mut Self {
        self.request.prompt(prompt);
        self
    }

    pub fn keep_alive(&mut self, seconds: i64) -> &mut Self {
        self.request.keep_alive(seconds);
        self
    }

    pub fn options(&mut self, options: Options) -> &mut Self {
        self.request.options(options);
        self
    }

    pub fn append_options(&mut self, append: Options) -> &mut Self {
        self.request.append_options(append);
        self
    }

    pub fn payload_retention(&mut self, retention: PayloadRetention) -> &mut Self {
        self.request.retention(retention);
        self
    }

    /// Registers the sink; from now on responses are streamed.
    pub fn callback<S>(&mut self, sink: S) -> &mut Self
    where
        S: EventSink + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Drops the sink; responses go back to whole-body decoding.
    pub fn clear_callback(&mut self) -> &mut Self {
        self.sink = None;
        self
    }

    pub fn has_callback(&self) -> bool {
        self.sink.is_some()
    }

    pub fn decoder_options(&mut self, options: DecoderOptions) -> &mut Self {
        self.decoder_options = options;
        self
    }

    /// Replaces the token that aborts in-flight requests.
    pub fn cancellation_token(&mut self, token: CancellationToken) -> &mut Self {
        self.cancellation_token = token;
        self
    }

    /// Handle that cancels whatever request this client is running.
    pub fn cancellation_handle(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn request(&self) -> &RequestBuilder {
        &self.request
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Stats of the last request, including any truncated tail.
    ///
    /// `None` unless the last request was streamed and finished successfully.
    pub fn last_stream(&self) -> Option<&StreamStats> {
        self.last_stream.as_ref()
    }

    pub(crate) fn request_mut(&mut self) -> &mut RequestBuilder {
        &mut self.request
    }

    pub(crate) async fn dispatch(
        &mut self,
        endpoint: Endpoint,
        payload: Option<OutgoingPayload>,
    ) -> Result<Value> {
        self.last_stream = None;
        check_cancelled!(self.cancellation_token);

        let base_url = self.request.current_base_url();
        validate_base_url(base_url)?;
        let url = endpoint_url(base_url, endpoint.path());

        let body = payload
            .filter(|_| endpoint.has_body())
            .map(OutgoingPayload::into_value);
        let streaming = self.sink.is_some();

        log_request(
            endpoint.method().as_str(),
            endpoint.path(),
            body.as_ref()
                .and_then(|b| b.get("model"))
                .and_then(|m| m.as_str()),
            streaming,
        );
        log_payload(endpoint.path(), body.as_ref());

        let start_time = Instant::now();
        let request = TransportRequest {
            method: endpoint.method(),
            url,
            body,
        };

        let result = match self.sink.as_deref_mut() {
            Some(sink) => read_streamed(
                &self.transport,
                request,
                sink,
                self.decoder_options,
                self.timeout,
                &self.cancellation_token,
            )
            .await
            .map(|(value, stats)| {
                self.last_stream = Some(stats);
                value
            }),
            None => read_buffered(&self.transport, request, &self.cancellation_token).await,
        };

        match &result {
            Ok(_) => log_timed(LOG_PREFIX_SUCCESS, endpoint.name(), start_time),
            Err(e) if e.is_cancelled() => log_timed(
                LOG_PREFIX_WARNING,
                &format!("{} cancelled", endpoint.name()),
                start_time,
            ),
            Err(e) => log_timed(
                LOG_PREFIX_ERROR,
                &format!("{} failed: {}", endpoint.name(), e),
                start_time,
            ),
        }

        result
    }
}
