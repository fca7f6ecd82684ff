//! Error types for the order gateway.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the order-processing service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The request never produced an HTTP response (DNS, refused connection, reset...).
    #[error("Network error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The body could not be parsed or lacks required fields.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No response within the configured bound.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::MalformedResponse(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::MalformedResponse(e.to_string())
    }
}
