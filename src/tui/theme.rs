// Color theme for the TUI
//
// One dark palette. `Color::Reset` for the background keeps the user's
// terminal background.

use crate::logging::LogLevel;
use ratatui::style::{Color, Modifier, Style};

/// Colors for every UI element
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Title and status
    pub title: Color,
    pub status_bar: Color,
    pub highlight: Color,

    // Transcript
    pub user: Color,
    pub assistant: Color,
    pub error: Color,
    pub pending: Color,

    // Markdown
    pub heading: Color,
    pub code_fg: Color,
    pub code_bg: Color,
    pub link: Color,
    pub quote: Color,

    // Log levels
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,
    pub log_trace: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            border_focused: Color::Cyan,

            title: Color::Cyan,
            status_bar: Color::Green,
            highlight: Color::Yellow,

            user: Color::LightBlue,
            assistant: Color::LightGreen,
            error: Color::Red,
            pending: Color::Magenta,

            heading: Color::Cyan,
            code_fg: Color::Yellow,
            code_bg: Color::Rgb(40, 40, 40),
            link: Color::LightBlue,
            quote: Color::Gray,

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::Gray,
            log_trace: Color::DarkGray,
        }
    }

    /// Style for a role label ("Human" / "AI")
    pub fn label_style(&self, color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn log_color(&self, level: LogLevel) -> Color {
        match level {
            LogLevel::Error => self.log_error,
            LogLevel::Warn => self.log_warn,
            LogLevel::Info => self.log_info,
            LogLevel::Debug => self.log_debug,
            LogLevel::Trace => self.log_trace,
        }
    }
}
