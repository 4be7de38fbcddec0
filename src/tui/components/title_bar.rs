// Title bar component
//
// Renders the app title with a spinner while a reply is outstanding.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Title text, with a spinner suffix when busy
pub fn title_text(app: &App) -> String {
    if app.is_busy() {
        format!(" {} {} waiting for reply", app.title, app.spinner_char())
    } else {
        format!(" {}", app.title)
    }
}

/// Render the title bar at the top of the screen
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = Paragraph::new(title_text(app))
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.title))
                .title_top(Line::from(" F1 help ").right_aligned()),
        );

    f.render_widget(title, area);
}
