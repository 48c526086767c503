//! Detail overlay rendering.
//!
//! Displays a modal overlay with the metrics, threshold levels and RTT
//! history of the selected target.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table},
    Frame,
};

use crate::app::App;
use crate::health::MetricLevel;
use crate::store::SAMPLE_WINDOW;
use crate::ui::format::{format_age, format_ms, format_pct, now_ms};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 18;

pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }
    let Some(target) = app.selected_target() else {
        return;
    };

    let overlay_width = ((u32::from(area.width) * 90 / 100) as u16).clamp(MIN_OVERLAY_WIDTH, 100);
    let overlay_height = ((u32::from(area.height) * 85 / 100) as u16).clamp(MIN_OVERLAY_HEIGHT, 30);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(5), // identity
        Constraint::Length(9), // metrics
        Constraint::Min(4),    // rtt history
        Constraint::Length(1), // footer
    ])
    .split(overlay_area);

    // Identity
    let now = now_ms();
    let online = target.is_online();
    let stale = target.is_stale(now, app.stale_after_ms);
    let presence = match (online, stale) {
        (false, _) => "offline".to_string(),
        (true, true) => format!(
            "stale, last sample {} ago",
            format_age(target.sample_age_ms(now).unwrap_or_default())
        ),
        (true, false) => "online".to_string(),
    };

    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", target.label),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(format!(" {}  (id: {})", target.address(), target.id)),
        Line::from(vec![
            Span::raw(" Status: "),
            Span::styled(presence, app.theme.presence_style(online, stale)),
            Span::raw(format!(
                "    Samples: {}/{}{}",
                target.samples().len(),
                SAMPLE_WINDOW,
                if target.is_warming_up() { " (warming up)" } else { "" }
            )),
        ]),
    ];

    let header_block = Block::default()
        .title(" Target Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // Metrics against thresholds
    let thresholds = app.store.thresholds();
    let levels = target.levels(thresholds);
    let m = &target.metrics;
    let level_cell = |level: Option<MetricLevel>| match level {
        Some(level) => Cell::from(format!("{:?}", level)).style(app.theme.level_style(level)),
        None => Cell::from("-"),
    };

    let rows = vec![
        Row::new(vec![
            Cell::from("Current RTT"),
            Cell::from(format_ms(m.current_rtt_ms)),
            Cell::from("-"),
            Cell::from("-"),
        ]),
        Row::new(vec![
            Cell::from("Max RTT"),
            Cell::from(format_ms(m.max_rtt_ms)),
            Cell::from("-"),
            Cell::from("-"),
        ]),
        Row::new(vec![
            Cell::from("p50"),
            Cell::from(format_ms(m.p50_ms)),
            Cell::from("-"),
            Cell::from("-"),
        ]),
        Row::new(vec![
            Cell::from("p95"),
            Cell::from(format_ms(m.p95_ms)),
            Cell::from(thresholds.map(|t| format_ms(t.p95_ms)).unwrap_or_else(|| "-".into())),
            level_cell(levels.map(|l| l.p95)),
        ]),
        Row::new(vec![
            Cell::from("Jitter"),
            Cell::from(format_ms(m.jitter_ms)),
            Cell::from(thresholds.map(|t| format_ms(t.jitter_ms)).unwrap_or_else(|| "-".into())),
            level_cell(levels.map(|l| l.jitter)),
        ]),
        Row::new(vec![
            Cell::from("Loss"),
            Cell::from(format_pct(m.loss_pct)),
            Cell::from(thresholds.map(|t| format_pct(t.loss_pct)).unwrap_or_else(|| "-".into())),
            level_cell(levels.map(|l| l.loss)),
        ]),
    ];

    let metrics = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["Metric", "Value", "Threshold", "Level"])
            .style(app.theme.header)
            .bottom_margin(1),
    )
    .block(
        Block::default()
            .title(" Metrics ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(metrics, chunks[1]);

    // RTT history, newest on the right
    let history_width = chunks[2].width.saturating_sub(2) as usize;
    let series = target.rtt_series(history_width.min(SAMPLE_WINDOW));
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(format!(" RTT (last {} samples) ", series.len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .data(&series)
        .style(Style::default().fg(app.theme.highlight));
    frame.render_widget(sparkline, chunks[2]);

    let footer = match thresholds {
        Some(_) => " Esc:close ↑↓:next target",
        None => " Alerting disabled | Esc:close ↑↓:next target",
    };
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().add_modifier(Modifier::DIM)),
        chunks[3],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ChannelTransport, TransportEvent};
    use ratatui::{backend::TestBackend, Terminal};

    fn app_with_target() -> App {
        let (tx, transport) = ChannelTransport::create("test");
        let mut app = App::new(Box::new(transport), 5000);
        app.start();
        let snapshot = serde_json::json!({
            "type": "snapshot",
            "targets": [{"id": "gw", "host": "192.168.1.1", "port": 80, "label": "Gateway",
                         "samples": [{"ts": 1, "rtt_ms": 1.5, "success": true}]}],
            "config": {"probe_interval_ms": 500, "probe_timeout_ms": 1500,
                       "thresholds": {"loss_pct": 5.0, "p95_ms": 100.0, "jitter_ms": 20.0}}
        });
        tx.try_send(TransportEvent::Frame(snapshot)).unwrap();
        app.pump();
        app.enter_detail();
        app
    }

    fn rendered_text(width: u16, height: u16, app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| render_overlay(frame, app, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_overlay_on_very_wide_terminal() {
        let app = app_with_target();
        assert!(app.show_detail_overlay);
        let text = rendered_text(1000, 40, &app);
        assert!(text.contains("Target Detail"));
        assert!(text.contains("Gateway"));
    }

    #[test]
    fn test_overlay_skipped_when_too_small() {
        let app = app_with_target();
        let text = rendered_text(40, 10, &app);
        assert!(!text.contains("Target Detail"));
    }
}
