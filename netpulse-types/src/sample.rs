//! Probe samples and the statistics the daemon derives from them.

/// One probe outcome.
///
/// `rtt_ms` is only meaningful when `success` is true; failed probes carry
/// whatever the daemon reported (usually 0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Unix timestamp in milliseconds when the probe completed.
    pub ts: u64,
    /// Round-trip time in milliseconds.
    pub rtt_ms: f64,
    /// Whether the probe got an answer before the timeout.
    pub success: bool,
}

impl Sample {
    /// A successful probe.
    pub fn ok(ts: u64, rtt_ms: f64) -> Self {
        Self {
            ts,
            rtt_ms,
            success: true,
        }
    }

    /// A probe that timed out or failed.
    pub fn failed(ts: u64) -> Self {
        Self {
            ts,
            rtt_ms: 0.0,
            success: false,
        }
    }

    /// RTT if the probe succeeded.
    pub fn rtt(&self) -> Option<f64> {
        self.success.then_some(self.rtt_ms)
    }
}

/// Statistics for one target over its current sample window.
///
/// Computed by the daemon and shipped as a unit; clients never derive these
/// from samples themselves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    /// RTT of the most recent successful probe. Zero or less means offline.
    pub current_rtt_ms: f64,
    /// Highest RTT in the window.
    pub max_rtt_ms: f64,
    /// Percentage of failed probes in the window.
    pub loss_pct: f64,
    /// Mean absolute difference between consecutive RTTs.
    pub jitter_ms: f64,
    /// Median latency.
    pub p50_ms: f64,
    /// 95th percentile latency.
    pub p95_ms: f64,
}

impl Metrics {
    /// A target is online while its latest probe produced a positive RTT.
    pub fn is_online(&self) -> bool {
        self.current_rtt_ms > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_sample_has_no_rtt() {
        assert_eq!(Sample::failed(10).rtt(), None);
        assert_eq!(Sample::ok(10, 4.5).rtt(), Some(4.5));
    }

    #[test]
    fn test_online_requires_positive_rtt() {
        let mut metrics = Metrics::default();
        assert!(!metrics.is_online());
        metrics.current_rtt_ms = -1.0;
        assert!(!metrics.is_online());
        metrics.current_rtt_ms = 0.3;
        assert!(metrics.is_online());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_metrics() {
        let json = r#"{
            "current_rtt_ms": 11.25,
            "max_rtt_ms": 40.0,
            "loss_pct": 0.83,
            "jitter_ms": 2.1,
            "p50_ms": 10.9,
            "p95_ms": 18.4
        }"#;
        let metrics: Metrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.current_rtt_ms, 11.25);
        assert_eq!(metrics.p95_ms, 18.4);
    }
}
