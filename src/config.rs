use humantime::parse_duration;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_KEEP_ALIVE_SECONDS, DEFAULT_TIMEOUT_SECONDS};
use crate::error::{ClientError, Result};
use crate::http::request::PayloadRetention;
use crate::streaming::DecoderOptions;

/// Everything a client needs at construction time.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Default model, overridable per call.
    pub model: Option<String>,
    pub keep_alive_seconds: i64,
    pub timeout_seconds: u64,
    pub decoder: DecoderOptions,
    pub payload_retention: PayloadRetention,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: None,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE_SECONDS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            decoder: DecoderOptions::default(),
            payload_retention: PayloadRetention::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, model: Option<&str>) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.map(str::to_string),
            ..Self::default()
        }
    }
}

pub fn validate_config(config: &ClientConfig) -> Result<()> {
    validate_base_url(&config.base_url)?;
    if config.timeout_seconds == 0 {
        return Err(ClientError::invalid_config(
            "timeout must be at least one second",
        ));
    }
    if config.decoder.max_buffer_size == 0 {
        return Err(ClientError::invalid_config(
            "max buffer size must be greater than zero",
        ));
    }
    Ok(())
}

pub fn validate_base_url(base_url: &str) -> Result<()> {
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ClientError::invalid_config(&format!(
            "invalid base URL (must start with http:// or https://): {}",
            base_url
        )));
    }
    if let Err(e) = url::Url::parse(base_url) {
        return Err(ClientError::invalid_config(&format!(
            "invalid base URL format: {}",
            e
        )));
    }
    Ok(())
}

/// Accepts whole seconds (`300`, `-1`) or durations such as `5m` or `1h30m`.
pub fn parse_keep_alive_seconds(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();

    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Ok(seconds);
    }

    let duration = parse_duration(trimmed).map_err(|_| {
        ClientError::invalid_config(
            "invalid keep_alive value. Use numeric seconds or durations like '5m'",
        )
    })?;

    i64::try_from(duration.as_secs())
        .map_err(|_| ClientError::invalid_config("keep_alive duration exceeds supported range"))
}
