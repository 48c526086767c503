//! Dashboard view: grade banner over the live target table.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::health::MetricLevel;
use crate::store::{LiveTarget, SAMPLE_WINDOW};
use crate::ui::format::{format_age, format_ms, format_pct, now_ms, sparkline};

/// Samples shown in the trend column.
const TREND_WIDTH: usize = 16;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(4), Constraint::Min(5)]).split(area);
    render_banner(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let health = app.store.health();
    let grade_style = app.theme.grade_style(health.grade);

    let thresholds = match app.store.thresholds() {
        Some(t) => format!(
            "thresholds: loss {} · p95 {} · jitter {}",
            format_pct(t.loss_pct),
            format_ms(t.p95_ms),
            format_ms(t.jitter_ms)
        ),
        None => "alerting disabled".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" Grade {} ", health.grade), grade_style.add_modifier(Modifier::REVERSED)),
            Span::raw("  "),
            Span::styled(health.message, grade_style),
        ]),
        Line::from(Span::styled(
            format!(" {}", thresholds),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Network Health ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let targets = app.store.targets();
    let thresholds = app.store.thresholds();
    let now = now_ms();

    let header = Row::new(vec![
        "Target", "Status", "RTT", "p50", "p95", "Jitter", "Loss", "Samples", "Trend",
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = targets
        .iter()
        .map(|t| {
            let levels = t.levels(thresholds);
            let level_of = |pick: fn(&crate::health::MetricLevels) -> MetricLevel| {
                levels.map(|l| app.theme.level_style(pick(&l))).unwrap_or_default()
            };
            let warming = t.is_warming_up();
            let muted = Style::default().fg(app.theme.muted);

            let derived = |value: f64, style: Style| {
                if warming {
                    Cell::from("warming up").style(muted)
                } else {
                    Cell::from(format_ms(value)).style(style)
                }
            };

            Row::new(vec![
                Cell::from(t.label.clone()),
                status_cell(app, t, now),
                Cell::from(format_ms(t.metrics.current_rtt_ms)),
                derived(t.metrics.p50_ms, Style::default()),
                derived(t.metrics.p95_ms, level_of(|l| l.p95)),
                derived(t.metrics.jitter_ms, level_of(|l| l.jitter)),
                Cell::from(format_pct(t.metrics.loss_pct)).style(level_of(|l| l.loss)),
                Cell::from(format!("{}/{}", t.samples().len(), SAMPLE_WINDOW)),
                Cell::from(sparkline(&t.rtt_series(TREND_WIDTH)))
                    .style(Style::default().fg(app.theme.highlight)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Min(12),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(8),
        Constraint::Min(TREND_WIDTH as u16),
    ];

    let selected = app.selected_target_index.min(targets.len().saturating_sub(1));
    let title = if targets.is_empty() {
        " Targets ".to_string()
    } else {
        format!(" Targets [{}/{}] ", selected + 1, targets.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !targets.is_empty() {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

/// "● online", "● offline" or "● stale 12s".
pub fn status_cell(app: &App, target: &LiveTarget, now: u64) -> Cell<'static> {
    let online = target.is_online();
    let stale = target.is_stale(now, app.stale_after_ms);
    let text = if !online {
        "● offline".to_string()
    } else if stale {
        let age = target.sample_age_ms(now).unwrap_or_default();
        format!("● stale {}", format_age(age))
    } else {
        "● online".to_string()
    };
    Cell::from(text).style(app.theme.presence_style(online, stale))
}
