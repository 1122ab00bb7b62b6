use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::constants::ERROR_TIMEOUT;
use crate::error::{ClientError, Result};
use crate::http::client::{Transport, TransportRequest};
use crate::http::parsing::body_is_blank;
use crate::streaming::{
    DecodedEvent, DecoderOptions, EventSink, IncompleteTrailingData, StreamDecoder,
    StreamSummary,
};

/// Bookkeeping for the most recent streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamStats {
    pub events: usize,
    pub skipped: usize,
    pub bytes_received: usize,
    pub trailing: Option<IncompleteTrailingData>,
}

impl StreamStats {
    fn from_summary(summary: &StreamSummary) -> Self {
        Self {
            events: summary.events,
            skipped: summary.skipped,
            bytes_received: summary.bytes_received,
            trailing: summary.trailing.clone(),
        }
    }
}

/// Decodes a fully buffered body as a single JSON value.
///
/// Empty bodies (copy and delete answer with none) decode to `null`.
pub fn decode_body(body: &[u8]) -> Result<Value> {
    if body_is_blank(body) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(body)
        .map_err(|e| ClientError::decode(&e.to_string(), &String::from_utf8_lossy(body)))
}

pub async fn read_buffered<T: Transport>(
    transport: &T,
    request: TransportRequest,
    cancellation_token: &CancellationToken,
) -> Result<Value> {
    let body = tokio::select! {
        biased;
        _ = cancellation_token.cancelled() => return Err(ClientError::cancelled()),
        result = transport.send(request) => result?,
    };

    decode_body(&body)
}

/// Feeds the response body through a [`StreamDecoder`], chunk by chunk.
///
/// The returned value is the whole transcript decoded as one document when
/// that works, otherwise the last event handed to the sink.
pub async fn read_streamed<T, S>(
    transport: &T,
    request: TransportRequest,
    sink: &mut S,
    options: DecoderOptions,
    chunk_timeout: Duration,
    cancellation_token: &CancellationToken,
) -> Result<(Value, StreamStats)>
where
    T: Transport,
    S: EventSink + ?Sized,
{
    let mut stream = tokio::select! {
        biased;
        _ = cancellation_token.cancelled() => return Err(ClientError::cancelled()),
        result = transport.send_streaming(request) => result?,
    };

    let mut decoder = StreamDecoder::new(options);
    let mut tracker = LastEventTracker { inner: sink, last: None };

    loop {
        let next = tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => return Err(ClientError::cancelled()),
            next = timeout(chunk_timeout, stream.next()) => {
                next.map_err(|_| ClientError::transport(ERROR_TIMEOUT))?
            }
        };

        match next {
            Some(Ok(chunk)) => {
                decoder.feed(&chunk, &mut tracker)?;
            }
            Some(Err(err)) => return Err(err),
            None => break,
        }
    }

    let summary = decoder.finish();
    let stats = StreamStats::from_summary(&summary);

    if let Some(trailing) = &stats.trailing {
        log::warn!(
            "stream ended with {} bytes of incomplete data; response may be truncated",
            trailing.len()
        );
    }

    let value = summary
        .decode_transcript()
        .or(tracker.last)
        .unwrap_or(Value::Null);

    Ok((value, stats))
}

struct LastEventTracker<'s, S: ?Sized> {
    inner: &'s mut S,
    last: Option<Value>,
}

impl<S: EventSink + ?Sized> EventSink for LastEventTracker<'_, S> {
    fn on_event(&mut self, event: &DecodedEvent<'_>) {
        self.inner.on_event(event);
        self.last = Some(event.value.clone());
    }

    fn on_decode_error(&mut self, error: &ClientError) {
        self.inner.on_decode_error(error);
    }
}
