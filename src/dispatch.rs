//! Turns raw stream frames into store mutations.

use netpulse_types::{Frame, NetEvent, Sample};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::store::LiveStore;

/// Decode one JSON frame.
///
/// Returns `Ok(None)` for frames whose `type` this client does not know;
/// those come from newer daemons and are skipped.
pub fn decode(value: Value) -> Result<Option<Frame>, DecodeError> {
    let kind = match &value {
        Value::Object(map) => match map.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            None => return Err(DecodeError::MissingType),
        },
        _ => return Err(DecodeError::NotAnObject),
    };

    if !Frame::is_known_type(&kind) {
        return Ok(None);
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| DecodeError::Invalid { kind, source })
}

/// Route a decoded frame to its store mutation.
pub fn apply(store: &mut LiveStore, frame: Frame) {
    match frame {
        Frame::Snapshot { targets, config } => {
            debug!(targets = targets.len(), "snapshot");
            store.set_snapshot(targets, config);
        }
        Frame::TargetsUpdated { targets, config } => {
            debug!(targets = targets.len(), "targets updated");
            store.set_targets(targets, config);
        }
        Frame::Sample {
            target_id,
            ts,
            rtt_ms,
            success,
        } => store.add_sample(
            &target_id,
            Sample {
                ts,
                rtt_ms,
                success,
            },
        ),
        Frame::Metrics { target_id, metrics } => store.update_metrics(&target_id, metrics),
        Frame::Event {
            ts,
            target_id,
            reason,
            details,
        } => store.add_event(NetEvent {
            ts,
            target_id,
            reason,
            details,
        }),
        Frame::ConfigUpdated { config } => store.update_config(config),
    }
}

/// Decode and apply one frame. Returns whether the store was handed a frame.
///
/// Decode failures are logged and dropped so one bad frame never stalls the
/// stream.
pub fn dispatch(store: &mut LiveStore, value: Value) -> bool {
    match decode(value) {
        Ok(Some(frame)) => {
            apply(store, frame);
            true
        }
        Ok(None) => {
            debug!("ignoring frame of unknown type");
            false
        }
        Err(e) => {
            warn!("dropping frame: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> Value {
        json!({
            "type": "snapshot",
            "targets": [{
                "id": "cloudflare", "host": "1.1.1.1", "port": 443, "label": "Cloudflare",
                "metrics": {"current_rtt_ms": 11.0, "max_rtt_ms": 20.0, "loss_pct": 0.0,
                            "jitter_ms": 1.0, "p50_ms": 10.0, "p95_ms": 15.0},
                "samples": [{"ts": 1, "rtt_ms": 11.0, "success": true}]
            }],
            "config": {"probe_interval_ms": 500, "probe_timeout_ms": 1500,
                       "thresholds": {"loss_pct": 5.0, "p95_ms": 100.0, "jitter_ms": 20.0}}
        })
    }

    #[test]
    fn test_decode_each_variant() {
        let frames = [
            snapshot(),
            json!({"type": "sample", "target_id": "cloudflare", "ts": 2, "rtt_ms": 9.5, "success": true}),
            json!({"type": "metrics", "target_id": "cloudflare", "metrics": {
                "current_rtt_ms": 9.5, "max_rtt_ms": 20.0, "loss_pct": 0.0,
                "jitter_ms": 1.0, "p50_ms": 10.0, "p95_ms": 15.0}}),
            json!({"type": "event", "ts": 3, "target_id": "cloudflare", "reason": "High latency",
                   "details": {"p95_ms": 130.0, "threshold": 100.0, "duration_s": 10.0}}),
            json!({"type": "config_updated", "config": {"probe_interval_ms": 1000, "probe_timeout_ms": 1500}}),
            json!({"type": "targets_updated", "targets": [], "config": {"probe_interval_ms": 500, "probe_timeout_ms": 1500}}),
        ];
        let kinds: Vec<&str> = frames
            .into_iter()
            .map(|v| decode(v).unwrap().unwrap().kind())
            .collect();
        assert_eq!(kinds, netpulse_types::FRAME_TYPES);
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        assert!(decode(json!({"type": "heartbeat", "ts": 1})).unwrap().is_none());
    }

    #[test]
    fn test_bad_known_frame_is_error() {
        let err = decode(json!({"type": "sample", "target_id": "cloudflare"})).unwrap_err();
        assert!(matches!(err, DecodeError::Invalid { ref kind, .. } if kind == "sample"));
        assert!(matches!(decode(json!([1, 2])), Err(DecodeError::NotAnObject)));
        assert!(matches!(decode(json!({"ts": 1})), Err(DecodeError::MissingType)));
    }

    #[test]
    fn test_event_without_details() {
        let frame = decode(json!({"type": "event", "ts": 3, "target_id": "gw", "reason": "Offline"}))
            .unwrap()
            .unwrap();
        let Frame::Event { details, .. } = frame else {
            panic!("expected event");
        };
        assert!(details.is_empty());
    }

    #[test]
    fn test_dispatch_applies_in_order() {
        let mut store = LiveStore::new();
        assert!(dispatch(&mut store, snapshot()));
        assert!(dispatch(
            &mut store,
            json!({"type": "sample", "target_id": "cloudflare", "ts": 2, "rtt_ms": 9.5, "success": true})
        ));
        assert!(!dispatch(&mut store, json!({"type": "sample", "ts": "bad"})));
        assert!(dispatch(
            &mut store,
            json!({"type": "sample", "target_id": "cloudflare", "ts": 3, "rtt_ms": 0.0, "success": false})
        ));

        let target = store.target("cloudflare").unwrap();
        let ts: Vec<u64> = target.samples().iter().map(|s| s.ts).collect();
        assert_eq!(ts, vec![1, 2, 3]);
        assert_eq!(store.thresholds().unwrap().p95_ms, 100.0);
    }

    #[test]
    fn test_dispatch_config_and_events() {
        let mut store = LiveStore::new();
        dispatch(&mut store, snapshot());
        dispatch(
            &mut store,
            json!({"type": "config_updated", "config": {"probe_interval_ms": 1000, "probe_timeout_ms": 2000}}),
        );
        dispatch(
            &mut store,
            json!({"type": "event", "ts": 9, "target_id": "cloudflare", "reason": "High packet loss",
                   "details": {"loss_pct": 12.0}}),
        );
        assert_eq!(store.config().unwrap().probe_interval_ms, 1000);
        assert!(store.thresholds().is_none());
        assert_eq!(store.events().last().unwrap().details["loss_pct"], 12.0);
    }

    #[test]
    fn test_targets_updated_replaces_set() {
        let mut store = LiveStore::new();
        dispatch(&mut store, snapshot());
        dispatch(
            &mut store,
            json!({"type": "targets_updated",
                   "targets": [{"id": "quad9", "host": "9.9.9.9", "port": 53, "label": "Quad9",
                                "metrics": {"current_rtt_ms": 0.0, "max_rtt_ms": 0.0, "loss_pct": 0.0,
                                            "jitter_ms": 0.0, "p50_ms": 0.0, "p95_ms": 0.0},
                                "samples": []}],
                   "config": {"probe_interval_ms": 500, "probe_timeout_ms": 1500}}),
        );
        assert!(store.target("cloudflare").is_none());
        assert!(store.target("quad9").unwrap().samples().is_empty());
    }
}
