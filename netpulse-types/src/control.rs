//! Request and response bodies of the daemon's HTTP control API.

use crate::{Config, TargetInfo};

/// Body of `GET /config`: the configuration plus the bare target list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DaemonConfig {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub config: Config,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: Vec<TargetInfo>,
}

/// Body of `POST /targets`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "action", rename_all = "snake_case"))]
pub enum TargetRequest {
    Add {
        host: String,
        port: u16,
        label: String,
    },
    Remove {
        target_id: String,
    },
}

/// Generic `{ok, error?, target_id?}` acknowledgement.
///
/// `target_id` is only set when a target was added.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ack {
    pub ok: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub target_id: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub error: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DaemonHealth {
    pub ok: bool,
    pub uptime_s: u64,
}
