//! Application state and navigation logic.
//!
//! [`App`] owns the [`LiveStore`] and is its only writer. Each tick the main
//! loop calls [`App::pump`], which drains the transport in arrival order and
//! applies every frame before anything is drawn.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::control::ControlClient;
use crate::dispatch;
use crate::store::{LiveStore, LiveTarget};
use crate::transport::{ConnectionState, Transport, TransportEvent};
use crate::ui::format::now_ms;
use crate::ui::Theme;

/// Upper bound on transport events applied per tick, so a burst cannot
/// starve input handling.
const MAX_EVENTS_PER_PUMP: usize = 4096;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(4);

/// The current view/tab in the TUI.
///
/// Target detail is an overlay (see `App::show_detail_overlay`), not a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Grade banner and the live target table.
    Dashboard,
    /// Event log, newest first.
    Events,
    /// Target management.
    Targets,
}

impl View {
    pub const ALL: [View; 3] = [View::Dashboard, View::Events, View::Targets];

    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Events,
            View::Events => View::Targets,
            View::Targets => View::Dashboard,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Targets,
            View::Events => View::Dashboard,
            View::Targets => View::Events,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Events => "Events",
            View::Targets => "Targets",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Events => 1,
            View::Targets => 2,
        }
    }
}

/// Result of a control request, reported back to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    Done(String),
    Failed(String),
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    transport: Box<dyn Transport>,
    pub store: LiveStore,
    control: Option<ControlClient>,
    outcomes_tx: mpsc::Sender<ControlOutcome>,
    outcomes_rx: mpsc::Receiver<ControlOutcome>,

    /// Samples older than this mark a target stale.
    pub stale_after_ms: u64,

    pub selected_target_index: usize,
    pub selected_event_index: usize,
    /// Target id awaiting `y` to confirm removal.
    pub pending_removal: Option<String>,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(transport: Box<dyn Transport>, stale_after_ms: u64) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::channel(16);
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            show_detail_overlay: false,
            transport,
            store: LiveStore::new(),
            control: None,
            outcomes_tx,
            outcomes_rx,
            stale_after_ms,
            selected_target_index: 0,
            selected_event_index: 0,
            pending_removal: None,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    /// Enable target management through the daemon's HTTP API.
    pub fn with_control(mut self, control: ControlClient) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn source_description(&self) -> &str {
        self.transport.description()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Open the stream.
    pub fn start(&mut self) {
        info!(source = self.transport.description(), "starting stream");
        self.transport.connect();
    }

    /// Close the stream. Nothing queued is applied afterwards.
    pub fn shutdown(&mut self) {
        self.transport.disconnect();
        self.store.set_connected(false);
    }

    /// Apply everything the transport and pending control requests have
    /// produced since the last call. Returns the number of transport events.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while applied < MAX_EVENTS_PER_PUMP {
            let Some(event) = self.transport.poll() else {
                break;
            };
            self.apply_event(event);
            applied += 1;
        }

        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            match outcome {
                ControlOutcome::Done(msg) | ControlOutcome::Failed(msg) => {
                    self.set_status_message(msg)
                }
            }
        }

        if applied > 0 {
            self.clamp_selection();
        }
        applied
    }

    fn apply_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.store.set_connected(true),
            TransportEvent::Closed => self.store.set_connected(false),
            TransportEvent::Frame(value) => {
                dispatch::dispatch(&mut self.store, value);
            }
        }
    }

    fn clamp_selection(&mut self) {
        let targets = self.store.target_count();
        if self.selected_target_index >= targets {
            self.selected_target_index = targets.saturating_sub(1);
        }
        let events = self.store.events().len();
        if self.selected_event_index >= events {
            self.selected_event_index = events.saturating_sub(1);
        }
        if targets == 0 {
            self.show_detail_overlay = false;
        }
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_TTL => Some(msg),
            _ => None,
        }
    }

    // Navigation

    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
        self.pending_removal = None;
    }

    fn list_len(&self) -> usize {
        match self.current_view {
            View::Dashboard | View::Targets => self.store.target_count(),
            View::Events => self.store.events().len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Dashboard | View::Targets => &mut self.selected_target_index,
            View::Events => &mut self.selected_event_index,
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        let selection = self.selection_mut();
        *selection = (*selection + n).min(max);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        let selection = self.selection_mut();
        *selection = selection.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    pub fn select_last(&mut self) {
        let last = self.list_len().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// The highlighted target in display order.
    pub fn selected_target(&self) -> Option<&LiveTarget> {
        self.store
            .targets()
            .get(self.selected_target_index)
            .copied()
    }

    pub fn enter_detail(&mut self) {
        if self.current_view != View::Events && self.selected_target().is_some() {
            self.show_detail_overlay = true;
        }
    }

    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Close the overlay, else cancel a pending removal, else return to the
    /// dashboard.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.pending_removal.is_some() {
            self.cancel_removal();
        } else {
            self.current_view = View::Dashboard;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    // Target management

    /// Ask for confirmation before removing the selected target.
    pub fn request_remove_selected(&mut self) {
        if self.current_view != View::Targets {
            return;
        }
        let Some(target) = self.selected_target() else {
            return;
        };
        let (id, label) = (target.id.clone(), target.label.clone());
        self.set_status_message(format!("Remove {} ({})? y:confirm Esc:cancel", label, id));
        self.pending_removal = Some(id);
    }

    pub fn cancel_removal(&mut self) {
        if self.pending_removal.take().is_some() {
            self.set_status_message("Removal cancelled".to_string());
        }
    }

    /// Send the confirmed removal to the daemon.
    ///
    /// The target stays on screen until the daemon's `targets_updated` frame
    /// arrives; the request's outcome shows up in the status bar.
    pub fn confirm_removal(&mut self) {
        let Some(target_id) = self.pending_removal.take() else {
            return;
        };
        let Some(control) = self.control.clone() else {
            self.set_status_message("Target management unavailable".to_string());
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime for control request");
            self.set_status_message("Target management unavailable".to_string());
            return;
        };

        self.set_status_message(format!("Removing {}...", target_id));
        let outcomes = self.outcomes_tx.clone();
        runtime.spawn(async move {
            let outcome = match control.remove_target(&target_id).await {
                Ok(()) => {
                    debug!(target_id = %target_id, "remove acknowledged");
                    ControlOutcome::Done(format!("Removed {}", target_id))
                }
                Err(e) => {
                    warn!(target_id = %target_id, "remove failed: {}", e);
                    ControlOutcome::Failed(format!("Remove {} failed: {}", target_id, e))
                }
            };
            let _ = outcomes.send(outcome).await;
        });
    }

    // Export

    /// Build the JSON document written by [`export_state`](Self::export_state).
    pub fn export_value(&self) -> Value {
        let now = now_ms();
        let thresholds = self.store.thresholds();
        let health = self.store.health();

        let targets: Vec<Value> = self
            .store
            .targets()
            .into_iter()
            .map(|t| {
                let m = &t.metrics;
                json!({
                    "id": t.id,
                    "label": t.label,
                    "address": t.address(),
                    "online": t.is_online(),
                    "stale": t.is_stale(now, self.stale_after_ms),
                    "warming_up": t.is_warming_up(),
                    "samples": t.samples().len(),
                    "metrics": {
                        "current_rtt_ms": m.current_rtt_ms,
                        "max_rtt_ms": m.max_rtt_ms,
                        "loss_pct": m.loss_pct,
                        "jitter_ms": m.jitter_ms,
                        "p50_ms": m.p50_ms,
                        "p95_ms": m.p95_ms,
                    },
                    "levels": t.levels(thresholds).map(|l| json!({
                        "loss": format!("{:?}", l.loss),
                        "p95": format!("{:?}", l.p95),
                        "jitter": format!("{:?}", l.jitter),
                    })),
                })
            })
            .collect();

        let events: Vec<Value> = self
            .store
            .events()
            .iter()
            .rev()
            .map(|e| {
                json!({
                    "ts": e.ts,
                    "target_id": e.target_id,
                    "reason": e.reason,
                    "details": e.details,
                })
            })
            .collect();

        json!({
            "exported_at_ms": now,
            "source": self.source_description(),
            "connected": self.store.is_connected(),
            "health": {
                "grade": health.grade.letter(),
                "message": health.message,
            },
            "config": self.store.config().map(|c| json!({
                "probe_interval_ms": c.probe_interval_ms,
                "probe_timeout_ms": c.probe_timeout_ms,
                "thresholds": c.thresholds.map(|t| json!({
                    "loss_pct": t.loss_pct,
                    "p95_ms": t.p95_ms,
                    "jitter_ms": t.jitter_ms,
                })),
            })),
            "targets": targets,
            "events": events,
        })
    }

    /// Write the current view of the fleet to `path` as pretty JSON.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.store.config().is_none() {
            anyhow::bail!("No data to export");
        }
        let json = serde_json::to_string_pretty(&self.export_value())?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "exported state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Grade;
    use crate::transport::ChannelTransport;

    const SNAPSHOT: &str = r#"{"type":"snapshot","targets":[
        {"id":"gw","host":"192.168.1.1","port":80,"label":"Gateway",
         "metrics":{"current_rtt_ms":1.5,"max_rtt_ms":4.0,"loss_pct":0.0,"jitter_ms":0.3,"p50_ms":1.4,"p95_ms":2.5},
         "samples":[{"ts":1,"rtt_ms":1.5,"success":true}]},
        {"id":"cloudflare","host":"1.1.1.1","port":443,"label":"Cloudflare",
         "metrics":{"current_rtt_ms":11.0,"max_rtt_ms":30.0,"loss_pct":1.0,"jitter_ms":2.0,"p50_ms":10.0,"p95_ms":19.0},
         "samples":[]}],
        "config":{"probe_interval_ms":500,"probe_timeout_ms":1500,
                  "thresholds":{"loss_pct":5.0,"p95_ms":100.0,"jitter_ms":20.0}}}"#;

    fn frame(json: &str) -> TransportEvent {
        TransportEvent::Frame(serde_json::from_str(json).unwrap())
    }

    fn connected_app() -> (mpsc::Sender<TransportEvent>, App) {
        let (tx, transport) = ChannelTransport::create("test");
        let mut app = App::new(Box::new(transport), 5000);
        app.start();
        (tx, app)
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Dashboard.next(), View::Events);
        assert_eq!(View::Dashboard.prev(), View::Targets);
        for view in View::ALL {
            assert_eq!(view.next().prev(), view);
            assert_eq!(View::ALL[view.index()], view);
        }
    }

    #[test]
    fn test_pump_applies_events_in_order() {
        let (tx, mut app) = connected_app();
        tx.try_send(TransportEvent::Opened).unwrap();
        tx.try_send(frame(SNAPSHOT)).unwrap();
        tx.try_send(frame(
            r#"{"type":"sample","target_id":"gw","ts":2,"rtt_ms":1.7,"success":true}"#,
        ))
        .unwrap();
        tx.try_send(frame(
            r#"{"type":"sample","target_id":"gw","ts":3,"rtt_ms":1.6,"success":true}"#,
        ))
        .unwrap();

        assert_eq!(app.pump(), 4);
        assert!(app.store.is_connected());
        let ts: Vec<u64> = app
            .store
            .target("gw")
            .unwrap()
            .samples()
            .iter()
            .map(|s| s.ts)
            .collect();
        assert_eq!(ts, vec![1, 2, 3]);
        assert_eq!(app.store.health().grade, Grade::A);

        tx.try_send(TransportEvent::Closed).unwrap();
        app.pump();
        assert!(!app.store.is_connected());
        // Data survives a disconnect until the next snapshot replaces it.
        assert_eq!(app.store.target_count(), 2);
    }

    #[test]
    fn test_shutdown_discards_queued_frames() {
        let (tx, mut app) = connected_app();
        tx.try_send(TransportEvent::Opened).unwrap();
        app.pump();
        let _ = tx.try_send(frame(SNAPSHOT));
        app.shutdown();
        assert_eq!(app.pump(), 0);
        assert_eq!(app.store.target_count(), 0);
        assert!(!app.store.is_connected());
    }

    #[test]
    fn test_selection_clamped_when_targets_removed() {
        let (tx, mut app) = connected_app();
        tx.try_send(frame(SNAPSHOT)).unwrap();
        app.pump();
        app.select_last();
        assert_eq!(app.selected_target_index, 1);
        assert_eq!(app.selected_target().unwrap().id, "gw");

        tx.try_send(frame(
            r#"{"type":"targets_updated","targets":[{"id":"cloudflare","host":"1.1.1.1","port":443,"label":"Cloudflare","samples":[]}],
                "config":{"probe_interval_ms":500,"probe_timeout_ms":1500}}"#,
        ))
        .unwrap();
        app.pump();
        assert_eq!(app.selected_target_index, 0);
        assert_eq!(app.selected_target().unwrap().id, "cloudflare");
    }

    #[test]
    fn test_go_back_order() {
        let (tx, mut app) = connected_app();
        tx.try_send(frame(SNAPSHOT)).unwrap();
        app.pump();

        app.set_view(View::Targets);
        app.enter_detail();
        assert!(app.show_detail_overlay);
        app.go_back();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::Targets);
        app.go_back();
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[test]
    fn test_removal_requires_targets_view_and_control() {
        let (tx, mut app) = connected_app();
        tx.try_send(frame(SNAPSHOT)).unwrap();
        app.pump();

        app.request_remove_selected();
        assert!(app.pending_removal.is_none());

        app.set_view(View::Targets);
        app.request_remove_selected();
        assert_eq!(app.pending_removal.as_deref(), Some("cloudflare"));

        app.confirm_removal();
        assert!(app.pending_removal.is_none());
        assert_eq!(app.get_status_message(), Some("Target management unavailable"));
        assert_eq!(app.store.target_count(), 2);
    }

    #[tokio::test]
    async fn test_confirmed_removal_reports_rejection() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/targets")
            .with_status(404)
            .with_body(r#"{"ok":false,"error":"target not found"}"#)
            .create_async()
            .await;
        let control = ControlClient::builder()
            .endpoint(server.url())
            .build()
            .unwrap();

        let (tx, transport) = ChannelTransport::create("test");
        let mut app = App::new(Box::new(transport), 5000).with_control(control);
        app.start();
        tx.try_send(frame(SNAPSHOT)).unwrap();
        app.pump();

        app.set_view(View::Targets);
        app.request_remove_selected();
        app.confirm_removal();

        let message = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                app.pump();
                if let Some(msg) = app.get_status_message() {
                    if msg.contains("failed") {
                        return msg.to_string();
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert!(message.contains("target not found"), "{}", message);
        // The store only changes when the daemon says so.
        assert_eq!(app.store.target_count(), 2);
        mock.assert_async().await;
    }

    #[test]
    fn test_export_requires_data() {
        let (_tx, app) = connected_app();
        let dir = tempfile::tempdir().unwrap();
        assert!(app.export_state(&dir.path().join("out.json")).is_err());
    }

    #[test]
    fn test_export_state() {
        let (tx, mut app) = connected_app();
        tx.try_send(frame(SNAPSHOT)).unwrap();
        tx.try_send(frame(
            r#"{"type":"event","ts":7,"target_id":"gw","reason":"High latency","details":{"p95_ms":150.0}}"#,
        ))
        .unwrap();
        app.pump();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netpulse_export.json");
        app.export_state(&path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["health"]["grade"], "A");
        assert_eq!(written["targets"].as_array().unwrap().len(), 2);
        assert_eq!(written["targets"][0]["id"], "cloudflare");
        assert_eq!(written["targets"][1]["samples"], 1);
        assert_eq!(written["targets"][1]["levels"]["p95"], "Ok");
        assert_eq!(written["events"][0]["reason"], "High latency");
        assert_eq!(written["config"]["thresholds"]["loss_pct"], 5.0);
    }
}
