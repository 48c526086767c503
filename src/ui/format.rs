//! Display formatting shared by the views and the headless printer.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Latency for table cells: "12.3ms", or "-" when nothing was measured.
pub fn format_ms(ms: f64) -> String {
    if ms <= 0.0 || !ms.is_finite() {
        "-".to_string()
    } else if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{:.1}ms", ms)
    }
}

pub fn format_pct(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// How long ago something happened, coarsely ("now", "4s", "3m", "2h").
pub fn format_age(age_ms: u64) -> String {
    let secs = age_ms / 1000;
    if secs == 0 {
        "now".to_string()
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h", secs / 3600)
    }
}

/// Daemon uptime as "1d 2h 3m" style text.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    match (days, hours) {
        (0, 0) => format!("{}m {}s", minutes, secs % 60),
        (0, _) => format!("{}h {}m", hours, minutes),
        _ => format!("{}d {}h {}m", days, hours, minutes),
    }
}

/// Local clock time of an epoch-millisecond timestamp.
pub fn format_clock(ts_ms: u64) -> String {
    match Utc.timestamp_millis_opt(ts_ms as i64).single() {
        Some(utc) => {
            let local: DateTime<Local> = utc.with_timezone(&Local);
            local.format("%H:%M:%S").to_string()
        }
        None => "--:--:--".to_string(),
    }
}

/// Scale `values` into sparkline bars relative to their own maximum.
///
/// Zeros (failed probes) render as the lowest bar.
pub fn sparkline(values: &[u64]) -> String {
    let max = values.iter().copied().max().unwrap_or(0);
    values
        .iter()
        .map(|&v| {
            let level = if max == 0 {
                0
            } else {
                ((u128::from(v) * 7 + u128::from(max) / 2) / u128::from(max)).min(7) as usize
            };
            SPARKLINE_CHARS[level]
        })
        .collect()
}
