use std::borrow::Cow;

use serde_json::Value;

use crate::constants::{DEFAULT_MAX_BUFFER_SIZE, INITIAL_BUFFER_CAPACITY};
use crate::error::{ClientError, Result};
use crate::logging::sanitize_log_message;
use crate::streaming::extractor::{ObjectScanner, ScanMode, leading_whitespace};

/// One complete object pulled out of the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent<'a> {
    pub value: Value,
    /// Exact source text of the object.
    pub raw: &'a str,
}

/// Receives decoded objects as soon as they complete.
pub trait EventSink {
    fn on_event(&mut self, event: &DecodedEvent<'_>);

    /// Called for malformed objects when the decoder is set to skip them.
    fn on_decode_error(&mut self, _error: &ClientError) {}
}

impl<F> EventSink for F
where
    F: FnMut(&Value, &str),
{
    fn on_event(&mut self, event: &DecodedEvent<'_>) {
        self(&event.value, event.raw)
    }
}

/// What to do with an object that is balanced but not valid JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrorPolicy {
    /// Fail the whole stream.
    #[default]
    Abort,
    /// Report it and keep going.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    pub scan_mode: ScanMode,
    pub error_policy: DecodeErrorPolicy,
    /// Upper bound for the unconsumed tail kept between reads.
    ///
    /// The transcript is kept only while it stays within the same bound.
    /// Past it, the transcript is dropped and
    /// [`StreamSummary::decode_transcript`] returns `None`.
    pub max_buffer_size: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::default(),
            error_policy: DecodeErrorPolicy::default(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

/// Bytes left in the buffer at end-of-stream that never formed an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteTrailingData {
    pub bytes: Vec<u8>,
}

impl IncompleteTrailingData {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// What a finished stream leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    /// Every byte received, in arrival order. Empty once the stream outgrew
    /// `max_buffer_size`.
    pub transcript: Vec<u8>,
    pub transcript_dropped: bool,
    pub bytes_received: usize,
    pub events: usize,
    pub skipped: usize,
    pub trailing: Option<IncompleteTrailingData>,
}

impl StreamSummary {
    /// Decodes the whole transcript as one JSON value.
    ///
    /// Streams of more than one object are not a single JSON document, so this
    /// returns `None` for them.
    pub fn decode_transcript(&self) -> Option<Value> {
        if self.transcript_dropped {
            return None;
        }
        serde_json::from_slice(&self.transcript).ok()
    }

    pub fn is_truncated(&self) -> bool {
        self.trailing.is_some()
    }
}

/// Incremental decoder for a body made of back-to-back JSON objects.
#[derive(Debug)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    scanner: ObjectScanner,
    transcript: Vec<u8>,
    transcript_dropped: bool,
    bytes_received: usize,
    options: DecoderOptions,
    events: usize,
    skipped: usize,
}

impl StreamDecoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            buffer: Vec::with_capacity(INITIAL_BUFFER_CAPACITY.min(options.max_buffer_size)),
            scanner: ObjectScanner::new(options.scan_mode),
            transcript: Vec::new(),
            transcript_dropped: false,
            bytes_received: 0,
            options,
            events: 0,
            skipped: 0,
        }
    }

    /// Appends a chunk and dispatches every object it completes.
    ///
    /// Returns the number of events handed to the sink for this chunk.
    pub fn feed<S>(&mut self, chunk: &[u8], sink: &mut S) -> Result<usize>
    where
        S: EventSink + ?Sized,
    {
        self.buffer.extend_from_slice(chunk);
        self.bytes_received += chunk.len();
        self.record_transcript(chunk);

        let mut dispatched = 0;

        while let Some(found) = self.scanner.scan(&self.buffer) {
            let consumed = found.consumed;
            let failure = match decode_event(found.text) {
                Ok(event) => {
                    sink.on_event(&event);
                    None
                }
                Err(err) => Some(err),
            };
            self.consume(consumed);

            match failure {
                None => {
                    dispatched += 1;
                    self.events += 1;
                }
                Some(err) => match self.options.error_policy {
                    DecodeErrorPolicy::Abort => return Err(err),
                    DecodeErrorPolicy::Skip => {
                        log::warn!(
                            "skipping malformed stream object: {} ({})",
                            err.message,
                            sanitize_log_message(err.raw_text().unwrap_or_default())
                        );
                        sink.on_decode_error(&err);
                        self.skipped += 1;
                    }
                },
            }
        }

        if self.buffer.len() > self.options.max_buffer_size {
            return Err(ClientError::buffer_overflow(self.options.max_buffer_size));
        }

        Ok(dispatched)
    }

    /// Ends the stream, handing back the transcript and any leftover tail.
    pub fn finish(self) -> StreamSummary {
        let trailing = if self.buffer.iter().all(|byte| byte.is_ascii_whitespace()) {
            None
        } else {
            Some(IncompleteTrailingData { bytes: self.buffer })
        };

        StreamSummary {
            transcript: self.transcript,
            transcript_dropped: self.transcript_dropped,
            bytes_received: self.bytes_received,
            events: self.events,
            skipped: self.skipped,
            trailing,
        }
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn events_dispatched(&self) -> usize {
        self.events
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    fn consume(&mut self, consumed: usize) {
        self.buffer.drain(..consumed);
        let whitespace = leading_whitespace(&self.buffer);
        self.buffer.drain(..whitespace);
        self.scanner.reset();
    }

    fn record_transcript(&mut self, chunk: &[u8]) {
        if self.transcript_dropped {
            return;
        }
        if self.transcript.len() + chunk.len() > self.options.max_buffer_size {
            log::debug!(
                "stream transcript exceeded {} bytes, no longer retained",
                self.options.max_buffer_size
            );
            self.transcript = Vec::new();
            self.transcript_dropped = true;
            return;
        }
        self.transcript.extend_from_slice(chunk);
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

fn decode_event(text: &[u8]) -> Result<DecodedEvent<'_>> {
    let raw = std::str::from_utf8(text).map_err(|e| {
        ClientError::decode(
            &format!("invalid UTF-8 in stream object: {}", e),
            &String::from_utf8_lossy(text),
        )
    })?;

    let value = serde_json::from_str::<Value>(raw)
        .map_err(|e| ClientError::decode(&e.to_string(), raw))?;

    Ok(DecodedEvent { value, raw })
}
