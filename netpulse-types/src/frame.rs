//! Stream frames pushed by the daemon over the WebSocket.

use std::collections::BTreeMap;

use crate::{Config, Metrics, NetEvent, Sample, Target};

/// Every `type` tag the current protocol defines.
///
/// Clients use this to tell a frame from a newer protocol revision (ignored)
/// apart from a broken frame of a known kind (reported).
pub const FRAME_TYPES: &[&str] = &[
    "snapshot",
    "sample",
    "metrics",
    "event",
    "config_updated",
    "targets_updated",
];

/// One decoded stream frame, discriminated on the wire by a `type` field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Frame {
    /// Full state, sent once after every (re)connection.
    Snapshot { targets: Vec<Target>, config: Config },
    /// One new probe result.
    Sample {
        target_id: String,
        ts: u64,
        rtt_ms: f64,
        success: bool,
    },
    /// Fresh statistics for one target.
    Metrics { target_id: String, metrics: Metrics },
    /// A notable condition.
    Event {
        ts: u64,
        target_id: String,
        reason: String,
        #[cfg_attr(feature = "serde", serde(default))]
        details: BTreeMap<String, f64>,
    },
    /// Configuration changed on the daemon.
    ConfigUpdated { config: Config },
    /// Targets were added or removed; same shape and meaning as `Snapshot`.
    TargetsUpdated { targets: Vec<Target>, config: Config },
}

impl Frame {
    /// The wire tag of this frame.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Snapshot { .. } => "snapshot",
            Frame::Sample { .. } => "sample",
            Frame::Metrics { .. } => "metrics",
            Frame::Event { .. } => "event",
            Frame::ConfigUpdated { .. } => "config_updated",
            Frame::TargetsUpdated { .. } => "targets_updated",
        }
    }

    /// Whether `tag` names a frame this protocol revision understands.
    pub fn is_known_type(tag: &str) -> bool {
        FRAME_TYPES.contains(&tag)
    }

    /// Build a `sample` frame from a [`Sample`].
    pub fn sample(target_id: impl Into<String>, sample: Sample) -> Self {
        Frame::Sample {
            target_id: target_id.into(),
            ts: sample.ts,
            rtt_ms: sample.rtt_ms,
            success: sample.success,
        }
    }

    /// Build an `event` frame from a [`NetEvent`].
    pub fn event(event: NetEvent) -> Self {
        Frame::Event {
            ts: event.ts,
            target_id: event.target_id,
            reason: event.reason,
            details: event.details,
        }
    }
}
