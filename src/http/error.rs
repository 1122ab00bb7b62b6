use crate::constants::{ERROR_SERVER_UNAVAILABLE, ERROR_TIMEOUT};
use crate::error::ClientError;

pub fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_connect() {
        log::error!("connection failed: {}", err);
        ClientError::transport(&format!("{}: {}", ERROR_SERVER_UNAVAILABLE, err))
    } else if err.is_timeout() {
        ClientError::transport(ERROR_TIMEOUT)
    } else if let Some(status) = err.status() {
        ClientError::status(status.as_u16(), &err.to_string())
    } else {
        log::error!("HTTP request failed: {}", err);
        ClientError::transport(&format!("request failed: {}", err))
    }
}
