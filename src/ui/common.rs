//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::transport::ConnectionState;

/// Render the header bar: connection badge, grade, fleet counts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.connection_state();
    let connected = app.store.is_connected();
    let badge_style = if connected {
        Style::default().fg(app.theme.healthy)
    } else {
        Style::default().fg(app.theme.critical)
    };

    let mut spans = vec![
        Span::styled(" ● ", badge_style),
        Span::styled("NETPULSE ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];

    if app.store.config().is_none() {
        spans.push(Span::raw(match state {
            ConnectionState::Open => "Waiting for snapshot...".to_string(),
            other => format!("{} ({})", app.source_description(), other),
        }));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let health = app.store.health();
    let online = app.store.targets().iter().filter(|t| t.is_online()).count();
    let total = app.store.target_count();

    spans.extend([
        Span::styled(format!("{} ", health.grade), app.theme.grade_style(health.grade)),
        Span::raw("│ "),
        Span::styled(
            online.to_string(),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(format!("/{} online │ ", total)),
        Span::styled(
            state.to_string(),
            if state.is_open() {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(app.theme.warning)
            },
        ),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let label = match v {
                View::Events => format!(" {}:{} ({}) ", i + 1, v.label(), app.store.events().len()),
                _ => format!(" {}:{} ", i + 1, v.label()),
            };
            Line::from(label)
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// A temporary status message, when present, replaces the key hints.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Dashboard => "↑↓:select Enter:detail Tab:switch e:export ?:help q:quit",
        View::Events => "↑↓:scroll Tab:switch e:export ?:help q:quit",
        View::Targets => "↑↓:select Enter:detail d:remove Tab:switch ?:help q:quit",
    };

    let status = match app.store.config() {
        Some(config) => format!(
            " {} | probe {}ms / timeout {}ms | {}",
            app.source_description(),
            config.probe_interval_ms,
            config.probe_timeout_ms,
            controls
        ),
        None => format!(" {} | {}", app.source_description(), controls),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2/3       Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Target detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Targets"),
        Line::from("  d           Remove selected target"),
        Line::from("  y           Confirm removal"),
        Line::from(""),
        section(" General"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_help_descriptions_aligned() {
        let (_tx, transport) = ChannelTransport::create("test");
        let app = App::new(Box::new(transport), 5000);
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| render_help(frame, &app, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let column_of = |needle: &str| {
            (0..buffer.area.height).find_map(|y| {
                let row: Vec<&str> = (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect();
                let line: String = row.concat();
                line.find(needle).map(|byte| line[..byte].chars().count())
            })
        };

        let go_back = column_of("Go back").unwrap();
        assert_eq!(column_of("Remove selected target"), Some(go_back));
        assert_eq!(column_of("Export to JSON"), Some(go_back));
        assert_eq!(column_of("Quit"), Some(go_back));
    }
}
