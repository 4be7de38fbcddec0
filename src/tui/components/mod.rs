// Components module - reusable UI building blocks
//
// Chat screen components:
// - Title bar: app title, busy spinner
// - Transcript: the conversation
// - Logs panel: System log entries (F2)
// - Status bar: session, model, message count, shortcuts
// - Toast: transient notices
//
// Each component is a focused, single-responsibility module.

pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;
pub mod transcript;

pub use toast::Toast;

// Re-export render functions for convenient access
// Usage: components::title_bar::render(f, area, app)
//    or: components::render_title(f, area, app)

use crate::tui::app::App;
use ratatui::{layout::Rect, Frame};

/// Render the title bar (convenience wrapper)
pub fn render_title(f: &mut Frame, area: Rect, app: &App) {
    title_bar::render(f, area, app);
}

/// Render the transcript pane (convenience wrapper)
pub fn render_transcript(f: &mut Frame, area: Rect, app: &mut App) {
    transcript::render(f, area, app);
}

/// Render the status bar (convenience wrapper)
pub fn render_status(f: &mut Frame, area: Rect, app: &App) {
    status_bar::render(f, area, app);
}

/// Render the logs panel (convenience wrapper)
pub fn render_logs_panel(f: &mut Frame, area: Rect, app: &App) {
    logs_panel::render(f, area, app);
}
