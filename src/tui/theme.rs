//! Colour palettes for the TUI, picked to suit the terminal background

use ratatui::prelude::*;

use crate::output::score_band;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score colours (strong / fair / weak)
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,

    pub bar_empty: Color,
    pub row_alt_bg: Color,
    pub index_color: Color,

    pub header_style: Style,
    pub row_selected: Style,
    pub field_focused: Style,

    pub muted: Color,
    pub title_color: Color,

    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            score_high: Color::Green,
            score_mid: Color::Yellow,
            score_low: Color::Red,
            bar_empty: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            field_focused: Style::new().fg(Color::Cyan).bold(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    pub fn light() -> Self {
        Self {
            score_high: Color::Rgb(0, 128, 64),
            score_mid: Color::Rgb(176, 112, 0),
            score_low: Color::Rgb(192, 32, 32),
            bar_empty: Color::Indexed(250),
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Indexed(244),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            field_focused: Style::new().fg(Color::Blue).bold(),
            muted: Color::Indexed(242),
            title_color: Color::Rgb(0, 110, 90),
            tab_active_style: Style::new().fg(Color::Blue).bold(),
            tab_inactive_style: Style::new().fg(Color::Indexed(246)),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 128, 64),
            flash_error: Color::Rgb(192, 32, 32),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
        }
    }

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    /// Colour for a score given as a percentage of the rubric total
    pub fn score_color(&self, percent: f64) -> Color {
        match score_band(percent) {
            2 => self.score_high,
            1 => self.score_mid,
            _ => self.score_low,
        }
    }
}

/// Detect the terminal background. Falls back to dark when the terminal does
/// not answer the query.
pub fn resolve_theme() -> Theme {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => Theme::Light,
        _ => Theme::Dark,
    }
}
