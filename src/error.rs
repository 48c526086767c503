//! Error types for the stream, frame decoding and the control API.

use thiserror::Error;

/// Errors returned by [`ControlClient`](crate::control::ControlClient).
#[derive(Debug, Error)]
pub enum ControlError {
    /// The daemon understood the request and refused it.
    #[error("Rejected by daemon: {0}")]
    Rejected(String),

    /// HTTP request failed, including non-2xx answers without an error body.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Could not reach the daemon.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The configured daemon URL cannot be used.
    #[error("Invalid daemon URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ControlError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ControlError::Timeout
        } else if err.is_connect() {
            ControlError::Connection(err.to_string())
        } else if err.is_decode() {
            ControlError::Parse(err.to_string())
        } else {
            ControlError::Http(err.to_string())
        }
    }
}

/// A stream frame with a known `type` whose fields could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("invalid `{kind}` frame: {source}")]
    Invalid {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures inside the stream connection loop.
///
/// These never escape the transport; they are logged and answered with a
/// reconnect.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid daemon URL: {0}")]
    InvalidUrl(String),

    #[error("WebSocket connect failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("WebSocket receive failed: {0}")]
    Receive(#[source] tokio_tungstenite::tungstenite::Error),
}
