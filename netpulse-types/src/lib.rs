//! # netpulse-types
//!
//! Wire types shared between the netpulse probing daemon and its clients.
//! The daemon pushes [`Frame`]s over a WebSocket and accepts configuration
//! changes over a small HTTP API; every payload on both channels is described
//! here.
//!
//! ## Features
//!
//! - `serde`: JSON (de)serialization matching the daemon's wire format
//!
//! ## Example
//!
//! ```rust
//! use netpulse_types::{Metrics, Sample, Target};
//!
//! let mut target = Target::new("cloudflare", "1.1.1.1", 443, "Cloudflare");
//! target.metrics = Metrics {
//!     current_rtt_ms: 12.5,
//!     ..Metrics::default()
//! };
//! target.samples.push(Sample::ok(1_703_160_000_000, 12.5));
//!
//! assert!(target.metrics.is_online());
//! assert_eq!(target.samples.len(), 1);
//! ```

mod config;
mod control;
mod event;
mod frame;
mod sample;
mod target;

pub use config::*;
pub use control::*;
pub use event::*;
pub use frame::*;
pub use sample::*;
pub use target::*;
