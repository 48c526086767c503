//! In-process transport.
//!
//! Events are pushed by the caller instead of a socket. Useful when the
//! dashboard is embedded next to something that already holds the stream,
//! and in tests.

use tokio::sync::mpsc;

use super::{ConnectionState, Transport, TransportEvent, EVENT_QUEUE_CAPACITY};

#[derive(Debug)]
pub struct ChannelTransport {
    receiver: Option<mpsc::Receiver<TransportEvent>>,
    description: String,
    state: ConnectionState,
}

impl ChannelTransport {
    /// Wrap an existing receiver.
    pub fn new(receiver: mpsc::Receiver<TransportEvent>, source_description: &str) -> Self {
        Self {
            receiver: Some(receiver),
            description: format!("channel: {}", source_description),
            state: ConnectionState::Idle,
        }
    }

    /// Create a sender and the transport it feeds.
    pub fn create(source_description: &str) -> (mpsc::Sender<TransportEvent>, Self) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        (tx, Self::new(rx, source_description))
    }
}

impl Transport for ChannelTransport {
    fn poll(&mut self) -> Option<TransportEvent> {
        if self.state == ConnectionState::Idle {
            return None;
        }
        let event = self.receiver.as_mut()?.try_recv().ok()?;
        match event {
            TransportEvent::Opened => self.state = ConnectionState::Open,
            TransportEvent::Closed => self.state = ConnectionState::Connecting,
            TransportEvent::Frame(_) => {}
        }
        Some(event)
    }

    fn connect(&mut self) {
        if self.state == ConnectionState::Idle && self.receiver.is_some() {
            self.state = ConnectionState::Connecting;
        }
    }

    fn disconnect(&mut self) {
        // Dropping the receiver discards anything still queued.
        self.receiver = None;
        self.state = ConnectionState::Idle;
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn description(&self) -> &str {
        &self.description
    }
}
