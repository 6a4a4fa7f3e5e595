//! Colour palette and text styles used across the demo UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── catalog view ───────────────────────────────────────────
    pub fn card_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn card_hover_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_unhover_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn offset_column_style() -> Style {
        Style::default().fg(Color::Cyan)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn log_style() -> Style {
        Style::default().fg(Color::Yellow)
    }
}
