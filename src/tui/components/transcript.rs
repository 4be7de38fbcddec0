// Transcript component
//
// Renders the conversation: a "Human"/"AI" header with local time above
// each message, user text as plain wrapped lines, assistant text as
// markdown. Error replies (the "Error: " prefix) render as plain red text
// and the pending placeholder as a spinner.

use crate::transcript::{Entry, Message, Role, Transcript};
use crate::tui::app::App;
use crate::tui::markdown::{render_markdown, wrap_plain};
use crate::tui::theme::Theme;
use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const ERROR_PREFIX: &str = "Error: ";
const EMPTY_HINT: &str = "Type a message and press Enter to start.";

fn header(label: &str, color: Color, time: Option<String>, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(label.to_string(), theme.label_style(color))];
    if let Some(time) = time {
        spans.push(Span::styled(
            format!("  {}", time),
            Style::default().fg(theme.muted),
        ));
    }
    Line::from(spans)
}

fn message_lines(message: &Message, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let time = message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();

    let (color, body) = match message.role {
        Role::User => (
            theme.user,
            wrap_plain(&message.content, width, Style::default().fg(theme.fg)),
        ),
        Role::Assistant if message.content.starts_with(ERROR_PREFIX) => (
            theme.assistant,
            wrap_plain(&message.content, width, Style::default().fg(theme.error)),
        ),
        Role::Assistant => (theme.assistant, render_markdown(&message.content, width, theme)),
    };

    let mut lines = vec![header(message.role.label(), color, Some(time), theme)];
    lines.extend(body);
    lines
}

fn pending_lines(spinner: char, theme: &Theme) -> Vec<Line<'static>> {
    vec![
        header(Role::Assistant.label(), theme.assistant, None, theme),
        Line::from(Span::styled(
            format!("{} Thinking…", spinner),
            Style::default()
                .fg(theme.pending)
                .add_modifier(Modifier::ITALIC),
        )),
    ]
}

/// All rendered lines for `transcript`, entries separated by a blank line
pub fn build_lines(
    transcript: &Transcript,
    width: usize,
    theme: &Theme,
    spinner: char,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, entry) in transcript.entries().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        match entry {
            Entry::Message(message) => lines.extend(message_lines(message, width, theme)),
            Entry::Pending => lines.extend(pending_lines(spinner, theme)),
        }
    }
    lines
}

/// Render the transcript pane and refresh the scroll dimensions
pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let width = area.width.saturating_sub(2) as usize;
    let viewport = area.height.saturating_sub(2) as usize;

    let lines = match app.current() {
        Some(state) if state.transcript.display_len() > 0 => {
            build_lines(&state.transcript, width, &app.theme, app.spinner_char())
        }
        _ => vec![Line::from(Span::styled(
            EMPTY_HINT,
            Style::default().fg(app.theme.muted),
        ))],
    };

    app.scroll.update_dimensions(lines.len(), viewport);
    let (start, end) = app.scroll.visible_range();
    let visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(end - start).collect();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
        .title(" Conversation ");

    let below = app.scroll.lines_below();
    if below > 0 {
        block = block.title_bottom(
            Line::from(format!(" ↓ {} more (End) ", below))
                .style(Style::default().fg(app.theme.highlight))
                .right_aligned(),
        );
    }

    f.render_widget(Paragraph::new(visible).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_entries_have_headers_and_separators() {
        let theme = Theme::default();
        let mut transcript = Transcript::new();
        transcript.append(Role::User, "Hi");
        transcript.append(Role::Assistant, "Hello!");

        let lines = build_lines(&transcript, 40, &theme, '⠋');
        let rendered: Vec<String> = lines.iter().map(text).collect();

        assert!(rendered[0].starts_with("Human  "));
        assert_eq!(rendered[1], "Hi");
        assert_eq!(rendered[2], "");
        assert!(rendered[3].starts_with("AI  "));
        assert!(rendered.iter().any(|l| l == "Hello!"));
    }

    #[test]
    fn test_error_reply_is_plain_red() {
        let theme = Theme::default();
        let mut transcript = Transcript::new();
        transcript.append(Role::Assistant, "Error: **invalid** key");

        let lines = build_lines(&transcript, 80, &theme, '⠋');
        assert_eq!(text(&lines[1]), "Error: **invalid** key");
        assert_eq!(lines[1].spans[0].style.fg, Some(theme.error));
    }

    #[test]
    fn test_pending_placeholder_shows_spinner() {
        let theme = Theme::default();
        let mut transcript = Transcript::new();
        transcript.append(Role::User, "Hi");
        transcript.push_pending();

        let lines = build_lines(&transcript, 40, &theme, '⠙');
        let last = text(lines.last().unwrap());
        assert_eq!(last, "⠙ Thinking…");
        assert_eq!(text(&lines[lines.len() - 2]), "AI");
    }

    #[test]
    fn test_user_text_is_not_markdown() {
        let theme = Theme::default();
        let mut transcript = Transcript::new();
        transcript.append(Role::User, "**not bold**");

        let lines = build_lines(&transcript, 40, &theme, '⠋');
        assert_eq!(text(&lines[1]), "**not bold**");
    }
}
