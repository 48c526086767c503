//! Daemon configuration as seen by clients.

/// Default probe interval used by the daemon.
pub const DEFAULT_PROBE_INTERVAL_MS: u32 = 500;
/// Default probe timeout used by the daemon.
pub const DEFAULT_PROBE_TIMEOUT_MS: u32 = 1500;

/// Alerting limits for the three graded metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds {
    /// Packet loss percentage.
    pub loss_pct: f64,
    /// 95th percentile latency in milliseconds.
    pub p95_ms: f64,
    /// Jitter in milliseconds.
    pub jitter_ms: f64,
}

impl Thresholds {
    pub const fn new(loss_pct: f64, p95_ms: f64, jitter_ms: f64) -> Self {
        Self {
            loss_pct,
            p95_ms,
            jitter_ms,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(5.0, 100.0, 20.0)
    }
}

/// Probe settings plus the active thresholds.
///
/// Always replaced wholesale; clients never merge partial updates into it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub probe_interval_ms: u32,
    pub probe_timeout_ms: u32,
    /// Absent means alerting is disabled.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub thresholds: Option<Thresholds>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_interval_ms: DEFAULT_PROBE_INTERVAL_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            thresholds: Some(Thresholds::default()),
        }
    }
}

/// Partial configuration change sent with `POST /config`.
///
/// Fields left as `None` are omitted from the request body and keep their
/// current value on the daemon.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigUpdate {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub probe_interval_ms: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub probe_timeout_ms: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub thresholds: Option<ThresholdsUpdate>,
}

impl ConfigUpdate {
    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.probe_interval_ms.is_none()
            && self.probe_timeout_ms.is_none()
            && self.thresholds.as_ref().map_or(true, ThresholdsUpdate::is_empty)
    }
}

/// Partial thresholds inside a [`ConfigUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdsUpdate {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub loss_pct: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub p95_ms: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub jitter_ms: Option<f64>,
}

impl ThresholdsUpdate {
    pub fn is_empty(&self) -> bool {
        self.loss_pct.is_none() && self.p95_ms.is_none() && self.jitter_ms.is_none()
    }
}
