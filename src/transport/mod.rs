//! Stream transport abstraction.
//!
//! A [`Transport`] keeps one logical connection to the daemon alive and hands
//! the application ordered [`TransportEvent`]s through a non-blocking
//! [`poll`](Transport::poll). The WebSocket implementation reconnects on its
//! own; the channel implementation is fed in-process.

mod backoff;
mod channel;
mod websocket;

pub use backoff::{Backoff, ReconnectPolicy};
pub use channel::ChannelTransport;
pub use websocket::WebSocketTransport;

use std::fmt::{self, Debug};
use std::time::Duration;

use serde_json::Value;

use crate::error::TransportError;

/// Capacity of the ordered channel between a transport task and its owner.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// What a transport reports to its owner, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The connection is up; the daemon will send a snapshot next.
    Opened,
    /// The connection ended; a reconnect is pending.
    Closed,
    /// One well-formed JSON frame.
    Frame(Value),
}

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not started, or disconnected on request.
    #[default]
    Idle,
    Connecting,
    Open,
    /// Waiting this long before the next attempt.
    Backoff(Duration),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => f.write_str("idle"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Open => f.write_str("live"),
            ConnectionState::Backoff(delay) => {
                write!(f, "reconnecting in {:.1}s", delay.as_secs_f64())
            }
        }
    }
}

/// A source of stream events.
///
/// # Example
///
/// ```
/// use netpulse_dash::transport::{ChannelTransport, Transport, TransportEvent};
///
/// let (tx, mut transport) = ChannelTransport::create("test");
/// transport.connect();
/// tx.try_send(TransportEvent::Opened).unwrap();
/// assert_eq!(transport.poll(), Some(TransportEvent::Opened));
/// assert_eq!(transport.poll(), None);
/// ```
pub trait Transport: Send + Debug {
    /// Take the next pending event without blocking.
    fn poll(&mut self) -> Option<TransportEvent>;

    /// Start the connection. Does nothing while one is already running.
    fn connect(&mut self);

    /// Stop the connection and cancel any pending reconnect.
    ///
    /// Idempotent. No event is delivered after this returns.
    fn disconnect(&mut self);

    fn state(&self) -> ConnectionState;

    /// Human-readable endpoint, shown in the header.
    fn description(&self) -> &str;
}

/// Derive the WebSocket endpoint from the daemon's HTTP origin.
///
/// `http` maps to `ws` and `https` to `wss`; `path` replaces whatever path
/// the origin had.
pub fn stream_url(origin: &str, path: &str) -> Result<String, TransportError> {
    let mut url = reqwest::Url::parse(origin)
        .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", origin, e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme `{}`",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| TransportError::InvalidUrl(origin.to_string()))?;
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
