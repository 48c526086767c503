//! Notable conditions reported by the daemon.

use std::collections::BTreeMap;

/// A daemon-detected condition, typically a "bad minute" where a metric
/// stayed above its threshold for long enough to be worth logging.
///
/// `details` is open-ended; the daemon currently sends the offending metric
/// (e.g. `loss_pct`), the `threshold`, and `duration_s`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetEvent {
    /// Unix timestamp in milliseconds.
    pub ts: u64,
    pub target_id: String,
    pub reason: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub details: BTreeMap<String, f64>,
}

impl NetEvent {
    pub fn new(ts: u64, target_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ts,
            target_id: target_id.into(),
            reason: reason.into(),
            details: BTreeMap::new(),
        }
    }

    /// Attach a named detail value.
    pub fn with_detail(mut self, key: impl Into<String>, value: f64) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_builder() {
        let event = NetEvent::new(5, "cloudflare", "High packet loss")
            .with_detail("loss_pct", 12.5)
            .with_detail("threshold", 5.0);
        assert_eq!(event.details.len(), 2);
        assert_eq!(event.details["loss_pct"], 12.5);
    }
}
