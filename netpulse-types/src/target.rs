//! Monitored endpoints.

use crate::{Metrics, Sample};

/// A monitored endpoint as carried by `snapshot` and `targets_updated` frames.
///
/// `samples` is oldest first. The daemon sends an empty list on
/// `targets_updated`, so it defaults when absent.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    /// Stable identifier, the slugified label (e.g. "cloudflare").
    pub id: String,
    /// Hostname or IP address.
    pub host: String,
    /// Probed TCP port.
    pub port: u16,
    /// Human-readable label.
    pub label: String,
    /// Latest statistics.
    #[cfg_attr(feature = "serde", serde(default))]
    pub metrics: Metrics,
    /// Recent probe outcomes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub samples: Vec<Sample>,
}

impl Target {
    /// Create a target with default metrics and no samples.
    pub fn new(
        id: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            port,
            label: label.into(),
            metrics: Metrics::default(),
            samples: Vec::new(),
        }
    }

    /// `host:port` for display.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Target definition as listed by `GET /config` (no metrics or samples).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetInfo {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub label: String,
}

impl From<&Target> for TargetInfo {
    fn from(target: &Target) -> Self {
        Self {
            id: target.id.clone(),
            host: target.host.clone(),
            port: target.port,
            label: target.label.clone(),
        }
    }
}
