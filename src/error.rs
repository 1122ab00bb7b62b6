use std::error::Error;
use std::fmt;

use crate::constants::{ERROR_BUFFER_OVERFLOW, ERROR_CANCELLED};

/// Error type for client operations
#[derive(Debug, Clone)]
pub struct ClientError {
    pub message: String,
    pub status_code: Option<u16>,
    kind: ClientErrorKind,
}

#[derive(Debug, Clone)]
enum ClientErrorKind {
    Transport,
    Decode { raw: String },
    BufferOverflow { limit: usize },
    Cancelled,
    InvalidConfig,
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn transport(message: &str) -> Self {
        Self {
            message: message.to_string(),
            status_code: None,
            kind: ClientErrorKind::Transport,
        }
    }

    /// Non-2xx response from the server.
    pub fn status(status_code: u16, message: &str) -> Self {
        Self {
            message: message.to_string(),
            status_code: Some(status_code),
            kind: ClientErrorKind::Transport,
        }
    }

    pub fn decode(message: &str, raw: &str) -> Self {
        Self {
            message: message.to_string(),
            status_code: None,
            kind: ClientErrorKind::Decode {
                raw: raw.to_string(),
            },
        }
    }

    pub fn buffer_overflow(limit: usize) -> Self {
        Self {
            message: format!("{} ({} bytes)", ERROR_BUFFER_OVERFLOW, limit),
            status_code: None,
            kind: ClientErrorKind::BufferOverflow { limit },
        }
    }

    pub fn cancelled() -> Self {
        Self {
            message: ERROR_CANCELLED.to_string(),
            status_code: None,
            kind: ClientErrorKind::Cancelled,
        }
    }

    pub fn invalid_config(message: &str) -> Self {
        Self {
            message: message.to_string(),
            status_code: None,
            kind: ClientErrorKind::InvalidConfig,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Transport)
    }

    pub fn is_decode(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Decode { .. })
    }

    pub fn is_buffer_overflow(&self) -> bool {
        matches!(self.kind, ClientErrorKind::BufferOverflow { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Cancelled)
    }

    pub fn is_invalid_config(&self) -> bool {
        matches!(self.kind, ClientErrorKind::InvalidConfig)
    }

    /// Raw object text that failed to decode.
    pub fn raw_text(&self) -> Option<&str> {
        match &self.kind {
            ClientErrorKind::Decode { raw } => Some(raw),
            _ => None,
        }
    }

    pub fn buffer_limit(&self) -> Option<usize> {
        match self.kind {
            ClientErrorKind::BufferOverflow { limit } => Some(limit),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, self.status_code) {
            (ClientErrorKind::Transport, Some(code)) => {
                write!(f, "transport error (HTTP {}): {}", code, self.message)
            }
            (ClientErrorKind::Transport, None) => write!(f, "transport error: {}", self.message),
            (ClientErrorKind::Decode { .. }, _) => write!(f, "decode error: {}", self.message),
            (ClientErrorKind::BufferOverflow { .. }, _)
            | (ClientErrorKind::Cancelled, _)
            | (ClientErrorKind::InvalidConfig, _) => write!(f, "{}", self.message),
        }
    }
}

impl Error for ClientError {}

#[macro_export]
macro_rules! check_cancelled {
    ($token:expr) => {
        if $token.is_cancelled() {
            return Err($crate::error::ClientError::cancelled());
        }
    };
}
