// Status bar component
//
// Renders session details at the bottom: uptime, session id, model,
// message count and the main shortcuts.

use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use crate::util::truncate_display;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const MODEL_WIDTH: usize = 28;

/// Status line for the current state
///
/// Adapts to terminal width:
/// - Wide: labels and shortcut hints
/// - Narrow: bare values
pub fn status_text(app: &App, width: u16) -> String {
    let bp = Breakpoint::from_width(width);
    let model = truncate_display(app.sessions.model(), MODEL_WIDTH);

    let Some(state) = app.current() else {
        return format!(" {} │ {} │ no session", app.uptime(), model);
    };
    let count = state.transcript.len();

    if !bp.at_least(Breakpoint::Wide) {
        format!(" {} │ {} │ 💬 {}", app.uptime(), model, count)
    } else {
        format!(
            " {} │ Session {} │ Model: {} │ Messages: {} │ ^S save  ^N new  ^Y copy  F1 help",
            app.uptime(),
            state.session.id,
            model,
            count,
        )
    }
}

/// Render the status bar
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let status = Paragraph::new(status_text(app, area.width))
        .style(Style::default().fg(app.theme.status_bar))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );

    f.render_widget(status, area);
}
