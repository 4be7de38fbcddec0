// Logs panel component
//
// Shows the most recent captured log entries, colored by level.

use crate::logging::LogEntry;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Module path without the crate prefix ("philo::tui::app" -> "tui::app")
fn short_target(target: &str) -> &str {
    target.strip_prefix("philo::").unwrap_or(target)
}

/// "[12:34:56] INFO  completion: message"
pub fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "[{}] {:5} {}: {}",
        entry.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
        entry.level.as_str(),
        short_target(&entry.target),
        entry.message
    )
}

fn log_item(entry: &LogEntry, theme: &Theme) -> ListItem<'static> {
    let line = Line::from(Span::styled(
        format_log_entry(entry),
        Style::default().fg(theme.log_color(entry.level)),
    ));
    ListItem::new(line)
}

/// Render the panel; shows as many entries as fit inside the border
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .log_buffer
        .recent(visible)
        .iter()
        .map(|entry| log_item(entry, &app.theme))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border))
            .title(format!(" System Logs ({}) ", app.log_buffer.len())),
    );

    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use chrono::Utc;

    #[test]
    fn test_format_log_entry() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Warn,
            target: "philo::completion".to_string(),
            message: "Completion failed status=401".to_string(),
        };
        let text = format_log_entry(&entry);
        assert!(text.starts_with('['));
        assert!(text.contains("WARN  completion: Completion failed status=401"));
    }

    #[test]
    fn test_foreign_targets_are_shown_in_full() {
        assert_eq!(short_target("philo::tui::app"), "tui::app");
        assert_eq!(short_target("philo"), "philo");
        assert_eq!(short_target("reqwest::connect"), "reqwest::connect");
    }
}
