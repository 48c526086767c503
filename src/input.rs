//! Keyboard and mouse handling for the TUI.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// File written by the `e` key, relative to the working directory.
pub const EXPORT_FILE: &str = "netpulse_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Step through targets while the overlay stays open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    // A pending removal takes y or is cancelled by anything else
    if app.pending_removal.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_removal(),
            _ => app.cancel_removal(),
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Events),
        KeyCode::Char('3') => app.set_view(View::Targets),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),

        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('d') | KeyCode::Delete => app.request_remove_selected(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Row of the first table entry in each view.
///
/// Header and tabs take one row each, the dashboard adds its four-row grade
/// banner, and every table has a top border plus a column header.
fn first_item_row(view: View) -> u16 {
    match view {
        View::Dashboard => 8,
        View::Events | View::Targets => 4,
    }
}

/// Which tab a click on the tab bar landed on.
fn tab_at_column(app: &App, column: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        let title = match view {
            View::Events => format!(" {}:{} ({}) ", view.index() + 1, view.label(), app.store.events().len()),
            _ => format!(" {}:{} ", view.index() + 1, view.label()),
        };
        // Tabs pads each title by one cell per side, plus a one-cell divider.
        let end = start + title.chars().count() as u16 + 2;
        if column < end {
            return Some(view);
        }
        start = end + 1;
    }
    None
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            if mouse.row == 1 {
                if let Some(view) = tab_at_column(app, mouse.column) {
                    app.set_view(view);
                }
                return;
            }

            if app.show_detail_overlay || app.show_help {
                return;
            }

            let first = first_item_row(app.current_view);
            if mouse.row < first {
                return;
            }
            let item = (mouse.row - first) as usize;
            match app.current_view {
                View::Dashboard | View::Targets => {
                    if item < app.store.target_count() {
                        app.selected_target_index = item;
                    }
                }
                View::Events => {
                    if item < app.store.events().len() {
                        app.selected_event_index = item;
                    }
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}
