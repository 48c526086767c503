//! # netpulse-dash
//!
//! A live terminal dashboard and library for the netpulse network probing
//! daemon.
//!
//! The daemon probes a set of targets over TCP and pushes samples, rolling
//! metrics and threshold events over a WebSocket. This crate keeps a bounded
//! local replica of that stream, grades overall network health, and drives
//! the daemon's HTTP control API to change probe settings and targets.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌───────────┐   ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//! │  │ transport │──▶│ dispatch │──▶│  store  │──▶│    ui     │  │
//! │  │ (frames)  │   │ (decode) │   │ (state) │   │ (render)  │  │
//! │  └─────▲─────┘   └──────────┘   └────┬────┘   └───────────┘  │
//! │        │                             │                       │
//! │  WebSocketTransport            health::classify              │
//! │  ChannelTransport                                            │
//! │                                                              │
//! │  control ──▶ daemon HTTP API (config, targets)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`transport`]**: The [`Transport`] trait, the reconnecting
//!   [`WebSocketTransport`], and [`ChannelTransport`] for tests and embedding
//! - **[`dispatch`]**: Decodes raw frames and applies them to the store
//! - **[`store`]**: [`LiveStore`], the bounded replica of the daemon's state
//! - **[`health`]**: Pure network grading with [`classify`]
//! - **[`control`]**: [`ControlClient`] for the daemon's HTTP API
//! - **[`app`]** / **[`input`]** / **[`ui`]**: The interactive dashboard
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard against a local daemon
//! netpulse-dash
//!
//! # Another host, plain text output
//! netpulse-dash --daemon-url http://10.0.0.5:7331 watch --headless
//!
//! # Tighten the loss threshold
//! netpulse-dash config set --loss-pct 2
//! ```
//!
//! ### As a library with a channel transport
//!
//! ```
//! use netpulse_dash::{App, ChannelTransport, Grade};
//! use netpulse_dash::transport::TransportEvent;
//! use serde_json::json;
//!
//! let (tx, transport) = ChannelTransport::create("embedded");
//! let mut app = App::new(Box::new(transport), 5000);
//! app.start();
//!
//! tx.try_send(TransportEvent::Frame(json!({
//!     "type": "snapshot",
//!     "targets": [],
//!     "config": {"probe_interval_ms": 500, "probe_timeout_ms": 1500}
//! })))
//! .unwrap();
//! app.pump();
//!
//! assert_eq!(app.store.health().grade, Grade::A);
//! ```
//!
//! ### Grading metrics directly
//!
//! ```
//! use netpulse_dash::{classify, Grade, Metrics, Thresholds};
//!
//! let lossy = Metrics { current_rtt_ms: 20.0, loss_pct: 12.0, ..Metrics::default() };
//! let report = classify([&lossy], Some(&Thresholds::default()));
//! assert_eq!(report.grade, Grade::F);
//! ```

pub mod app;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod input;
pub mod settings;
pub mod store;
pub mod transport;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use control::ControlClient;
pub use error::{ControlError, DecodeError, TransportError};
pub use health::{classify, Grade, HealthReport, MetricLevel};
pub use settings::Settings;
pub use store::{LiveStore, LiveTarget};
pub use transport::{ChannelTransport, ConnectionState, Transport, WebSocketTransport};

pub use netpulse_types::{
    Config, ConfigUpdate, Frame, Metrics, NetEvent, Sample, Target, Thresholds, ThresholdsUpdate,
};
