//! Event log view, newest first.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::format::format_clock;
use netpulse_types::NetEvent;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let events = app.store.events();

    let header = Row::new(vec!["Time", "Target", "Reason", "Details"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = events
        .iter()
        .rev()
        .map(|e| {
            let label = app
                .store
                .target(&e.target_id)
                .map(|t| t.label.clone())
                .unwrap_or_else(|| e.target_id.clone());
            Row::new(vec![
                Cell::from(format_clock(e.ts)),
                Cell::from(label),
                Cell::from(e.reason.clone()).style(Style::default().fg(app.theme.warning)),
                Cell::from(format_details(e)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Fill(3),
    ];

    let title = format!(" Events ({}) ", events.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected);

    let mut state = TableState::default();
    if !events.is_empty() {
        state.select(Some(app.selected_event_index.min(events.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

/// `key=value` pairs, e.g. "duration_s=10 loss_pct=12.5 threshold=5".
pub fn format_details(event: &NetEvent) -> String {
    event
        .details
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_details_sorted_by_key() {
        let event = NetEvent::new(1, "gw", "High packet loss")
            .with_detail("threshold", 5.0)
            .with_detail("loss_pct", 12.5)
            .with_detail("duration_s", 10.0);
        assert_eq!(format_details(&event), "duration_s=10 loss_pct=12.5 threshold=5");
    }
}
