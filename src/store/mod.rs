//! Client-side state mirrored from the daemon's stream.
//!
//! [`LiveStore`] is owned by a single writer (the application loop) and
//! mutated only through the narrow API below. Each mutation completes before
//! it returns, so a read that follows always observes the new state. Passive
//! observers watch the revision counter through [`LiveStore::subscribe`].

mod window;

pub use window::{BoundedWindow, EVENT_LOG_CAPACITY, SAMPLE_WINDOW};

use std::collections::HashMap;

use netpulse_types::{Config, Metrics, NetEvent, Sample, Target, Thresholds};
use tokio::sync::watch;
use tracing::debug;

use crate::health::{self, HealthReport, MetricLevels};

/// Targets with fewer samples than this are still collecting a baseline.
pub const WARMUP_SAMPLES: usize = 20;

/// A monitored endpoint with its bounded sample window.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveTarget {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub label: String,
    pub metrics: Metrics,
    samples: BoundedWindow<Sample>,
}

impl LiveTarget {
    fn from_wire(target: Target) -> Self {
        Self {
            samples: BoundedWindow::from_iter_newest(SAMPLE_WINDOW, target.samples),
            id: target.id,
            host: target.host,
            port: target.port,
            label: target.label,
            metrics: target.metrics,
        }
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> &BoundedWindow<Sample> {
        &self.samples
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_online(&self) -> bool {
        self.metrics.is_online()
    }

    pub fn is_warming_up(&self) -> bool {
        self.samples.len() < WARMUP_SAMPLES
    }

    /// Timestamp of the newest sample.
    pub fn last_sample_ts(&self) -> Option<u64> {
        self.samples.last().map(|s| s.ts)
    }

    /// Milliseconds since the newest sample, if any arrived yet.
    pub fn sample_age_ms(&self, now_ms: u64) -> Option<u64> {
        self.last_sample_ts().map(|ts| now_ms.saturating_sub(ts))
    }

    /// Whether the newest sample is older than `stale_after_ms`.
    ///
    /// A target without samples is never stale; it is still warming up.
    pub fn is_stale(&self, now_ms: u64, stale_after_ms: u64) -> bool {
        self.sample_age_ms(now_ms)
            .is_some_and(|age| age > stale_after_ms)
    }

    /// RTTs of the newest `n` samples for sparklines. Failed probes are 0.
    pub fn rtt_series(&self, n: usize) -> Vec<u64> {
        self.samples
            .newest(n)
            .map(|s| s.rtt().map_or(0, |rtt| rtt.round().max(0.0) as u64))
            .collect()
    }

    /// Per-metric levels, or `None` when alerting is disabled.
    pub fn levels(&self, thresholds: Option<&Thresholds>) -> Option<MetricLevels> {
        thresholds.map(|t| MetricLevels::of(&self.metrics, t))
    }
}

/// Live mirror of the daemon's targets, events and configuration.
#[derive(Debug)]
pub struct LiveStore {
    targets: HashMap<String, LiveTarget>,
    config: Option<Config>,
    events: BoundedWindow<NetEvent>,
    connected: bool,
    revision: u64,
    notifier: watch::Sender<u64>,
}

impl Default for LiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveStore {
    /// Empty and disconnected.
    pub fn new() -> Self {
        let (notifier, _) = watch::channel(0);
        Self {
            targets: HashMap::new(),
            config: None,
            events: BoundedWindow::new(EVENT_LOG_CAPACITY),
            connected: false,
            revision: 0,
            notifier,
        }
    }

    /// Receive the revision number after every effective change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notifier.subscribe()
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.notifier.send_replace(self.revision);
    }

    // Mutations

    /// Replace targets and configuration wholesale.
    ///
    /// Targets not present in `targets` are dropped. Samples beyond the window
    /// capacity are trimmed, keeping the newest.
    pub fn set_snapshot(&mut self, targets: Vec<Target>, config: Config) {
        self.targets = targets
            .into_iter()
            .map(|t| (t.id.clone(), LiveTarget::from_wire(t)))
            .collect();
        self.config = Some(config);
        self.touch();
    }

    /// Apply a `targets_updated` frame. Identical to [`set_snapshot`](Self::set_snapshot).
    pub fn set_targets(&mut self, targets: Vec<Target>, config: Config) {
        self.set_snapshot(targets, config);
    }

    /// Append a sample to a known target's window.
    pub fn add_sample(&mut self, target_id: &str, sample: Sample) {
        let Some(target) = self.targets.get_mut(target_id) else {
            debug!(target_id, "sample for unknown target ignored");
            return;
        };
        target.samples.push(sample);
        self.touch();
    }

    /// Replace a known target's metrics.
    pub fn update_metrics(&mut self, target_id: &str, metrics: Metrics) {
        let Some(target) = self.targets.get_mut(target_id) else {
            debug!(target_id, "metrics for unknown target ignored");
            return;
        };
        target.metrics = metrics;
        self.touch();
    }

    /// Append to the event log.
    pub fn add_event(&mut self, event: NetEvent) {
        self.events.push(event);
        self.touch();
    }

    pub fn update_config(&mut self, config: Config) {
        self.config = Some(config);
        self.touch();
    }

    pub fn set_connected(&mut self, connected: bool) {
        if self.connected != connected {
            self.connected = connected;
            self.touch();
        }
    }

    // Reads

    /// Targets sorted by label, then id.
    pub fn targets(&self) -> Vec<&LiveTarget> {
        let mut targets: Vec<&LiveTarget> = self.targets.values().collect();
        targets.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
        targets
    }

    pub fn target(&self, id: &str) -> Option<&LiveTarget> {
        self.targets.get(id)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// `None` until the first snapshot.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    pub fn thresholds(&self) -> Option<&Thresholds> {
        self.config.as_ref().and_then(|c| c.thresholds.as_ref())
    }

    /// Event log, oldest first.
    pub fn events(&self) -> &BoundedWindow<NetEvent> {
        &self.events
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Grade the fleet as it stands right now.
    pub fn health(&self) -> HealthReport {
        health::classify(self.targets.values().map(|t| &t.metrics), self.thresholds())
    }
}
