//! WebSocket transport.
//!
//! One background task owns the socket and the reconnect loop, so at most
//! one reconnect can ever be pending. It forwards parsed frames to the owner
//! over an ordered channel that the owner drains with
//! [`poll`](super::Transport::poll).

use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::{
    stream_url, Backoff, ConnectionState, ReconnectPolicy, Transport, TransportEvent,
    EVENT_QUEUE_CAPACITY,
};
use crate::error::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Keeps a WebSocket to the daemon open, reconnecting with backoff.
///
/// # Example
///
/// ```
/// use netpulse_dash::transport::{ConnectionState, ReconnectPolicy, Transport, WebSocketTransport};
///
/// # tokio_test::block_on(async {
/// let mut transport =
///     WebSocketTransport::new("http://127.0.0.1:1", "/ws", ReconnectPolicy::default()).unwrap();
/// assert_eq!(transport.url(), "ws://127.0.0.1:1/ws");
/// assert_eq!(transport.state(), ConnectionState::Idle);
///
/// transport.connect();
/// assert_ne!(transport.state(), ConnectionState::Idle);
///
/// transport.disconnect();
/// assert_eq!(transport.state(), ConnectionState::Idle);
/// assert_eq!(transport.poll(), None);
/// # });
/// ```
#[derive(Debug)]
pub struct WebSocketTransport {
    url: String,
    policy: ReconnectPolicy,
    description: String,
    worker: Option<Worker>,
}

#[derive(Debug)]
struct Worker {
    events: mpsc::Receiver<TransportEvent>,
    state: watch::Receiver<ConnectionState>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl WebSocketTransport {
    /// Prepare a transport for `origin` (the daemon's `http(s)://` address).
    ///
    /// Nothing is started until [`connect`](Transport::connect).
    pub fn new(origin: &str, path: &str, policy: ReconnectPolicy) -> Result<Self, TransportError> {
        let url = stream_url(origin, path)?;
        Ok(Self {
            description: url.clone(),
            url,
            policy,
            worker: None,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WebSocketTransport {
    fn poll(&mut self) -> Option<TransportEvent> {
        self.worker.as_mut()?.events.try_recv().ok()
    }

    fn connect(&mut self) {
        if self
            .worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
        {
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available, stream not started");
            return;
        };

        let (events_tx, events) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = runtime.spawn(run_connection(
            self.url.clone(),
            self.policy,
            events_tx,
            state_tx,
            shutdown_rx,
        ));

        self.worker = Some(Worker {
            events,
            state,
            shutdown,
            handle,
        });
    }

    fn disconnect(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown.send(true);
            worker.handle.abort();
            // worker.events is dropped here, discarding queued frames.
            info!(url = %self.url, "stream disconnected");
        }
    }

    fn state(&self) -> ConnectionState {
        match &self.worker {
            Some(worker) => *worker.state.borrow(),
            None => ConnectionState::Idle,
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

enum ReadOutcome {
    /// The connection ended and should be retried.
    Ended,
    /// Shutdown was requested or the owner went away.
    Stop,
}

async fn run_connection(
    url: String,
    policy: ReconnectPolicy,
    events: mpsc::Sender<TransportEvent>,
    state: watch::Sender<ConnectionState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut backoff = Backoff::new(policy);

    loop {
        state.send_replace(ConnectionState::Connecting);
        debug!(%url, "connecting");

        let attempt = tokio::select! {
            _ = shutdown.changed() => break,
            attempt = tokio_tungstenite::connect_async(url.as_str()) => attempt,
        };

        match attempt {
            Ok((stream, _)) => {
                info!(%url, "stream connected");
                backoff.reset();
                state.send_replace(ConnectionState::Open);
                if events.send(TransportEvent::Opened).await.is_err() {
                    break;
                }
                if let ReadOutcome::Stop = read_frames(stream, &events, &mut shutdown).await {
                    break;
                }
                if events.send(TransportEvent::Closed).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("{}", TransportError::Connect(e)),
        }

        let delay = backoff.next_delay();
        info!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");
        state.send_replace(ConnectionState::Backoff(delay));

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    state.send_replace(ConnectionState::Idle);
    debug!("stream task finished");
}

async fn read_frames(
    mut stream: WsStream,
    events: &mpsc::Sender<TransportEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> ReadOutcome {
    loop {
        let message = tokio::select! {
            _ = shutdown.changed() => return ReadOutcome::Stop,
            message = stream.next() => message,
        };

        match message {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<Value>(text.as_str()) {
                Ok(value) => {
                    if events.send(TransportEvent::Frame(value)).await.is_err() {
                        return ReadOutcome::Stop;
                    }
                }
                Err(e) => warn!("discarding malformed frame: {}", e),
            },
            Some(Ok(Message::Close(frame))) => {
                info!(?frame, "stream closed by daemon");
                return ReadOutcome::Ended;
            }
            // Binary frames are not part of the protocol; ping/pong is
            // answered by tungstenite.
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!("{}", TransportError::Receive(e));
                return ReadOutcome::Ended;
            }
            None => {
                info!("stream ended");
                return ReadOutcome::Ended;
            }
        }
    }
}
