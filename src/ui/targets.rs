//! Target management view.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::dashboard::status_cell;
use crate::ui::format::{format_age, now_ms};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let targets = app.store.targets();
    let now = now_ms();

    let header = Row::new(vec!["Label", "Id", "Host", "Port", "Status", "Last sample"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = targets
        .iter()
        .map(|t| {
            let pending = app.pending_removal.as_deref() == Some(t.id.as_str());
            let row = Row::new(vec![
                Cell::from(t.label.clone()),
                Cell::from(t.id.clone()),
                Cell::from(t.host.clone()),
                Cell::from(t.port.to_string()),
                status_cell(app, t, now),
                Cell::from(
                    t.sample_age_ms(now)
                        .map(format_age)
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
            if pending {
                row.style(
                    Style::default()
                        .fg(app.theme.critical)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(6),
        Constraint::Min(12),
        Constraint::Length(12),
    ];

    let title = match &app.pending_removal {
        Some(id) => format!(" Targets: remove {}? [y:confirm Esc:cancel] ", id),
        None => format!(" Targets ({}) [d:remove] ", targets.len()),
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
        state.select(Some(app.selected_target_index.min(targets.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
