//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::health::{Grade, MetricLevel};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Metrics approaching a threshold.
    pub warning: Color,
    /// Metrics above a threshold, offline targets.
    pub critical: Color,
    pub healthy: Color,
    /// Stale data and secondary text.
    pub muted: Color,
    pub border: Color,
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self::with_accent(Color::Cyan, Color::Gray, Color::DarkGray, Color::DarkGray)
    }

    /// Darker accents and a tinted selection, readable on white.
    pub fn light() -> Self {
        let mut theme = Self::with_accent(Color::Blue, Color::DarkGray, Color::Gray, Color::LightBlue);
        theme.warning = Color::Rgb(176, 112, 0);
        theme
    }

    fn with_accent(accent: Color, border: Color, muted: Color, selection: Color) -> Self {
        let accented = Style::default().fg(accent).add_modifier(Modifier::BOLD);
        Self {
            highlight: accent,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            muted,
            border,
            header: accented,
            selected: Style::default().bg(selection).add_modifier(Modifier::BOLD),
            tab_active: accented,
            tab_inactive: Style::default().fg(border),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn grade_style(&self, grade: Grade) -> Style {
        let color = match grade {
            Grade::A => self.healthy,
            Grade::B => self.highlight,
            Grade::C => self.warning,
            Grade::D | Grade::F => self.critical,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn level_style(&self, level: MetricLevel) -> Style {
        match level {
            MetricLevel::Ok => Style::default(),
            MetricLevel::Warn => Style::default().fg(self.warning),
            MetricLevel::Alert => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Style of the online/offline marker.
    pub fn presence_style(&self, online: bool, stale: bool) -> Style {
        if !online {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        } else if stale {
            Style::default().fg(self.muted)
        } else {
            Style::default().fg(self.healthy)
        }
    }
}
