// UI rendering logic
//
// Everything drawn each frame starts here. `draw` picks the screen, then
// layers the modal and toast on top.

use super::app::{App, Screen};
use super::components::{render_logs_panel, render_status, render_title, render_transcript};
use super::input::TextInput;
use super::layout::{centered_rect, Breakpoint};
use super::modal::{Modal, HELP_KEYS};
use super::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Input box grows with its content up to this height (borders included)
const MAX_INPUT_HEIGHT: u16 = 8;
const LOG_PANEL_HEIGHT: u16 = 8;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Setup => draw_setup(f, app),
        Screen::Chat => draw_chat(f, app),
    }

    if let Some(modal) = app.modal {
        draw_modal(f, modal, &app.theme);
    }

    if let Some(toast) = &app.toast {
        let area = f.area();
        toast.render(f, area, &app.theme);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Setup screen
// ─────────────────────────────────────────────────────────────────────────────

/// Show only the last four characters of a key
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    let visible = count.min(4);
    let tail: String = key.chars().skip(count - visible).collect();
    format!("{}{}", "•".repeat(count - visible), tail)
}

fn draw_setup(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(64, 11, f.area());
    let field_width = area.width.saturating_sub(4) as usize;

    let masked = mask_key(app.key_input.value());
    // Keep the end of a long key in view
    let skip = masked.chars().count().saturating_sub(field_width.saturating_sub(1));
    let shown: String = masked.chars().skip(skip).collect();

    let mut lines = vec![
        Line::from(Span::styled(
            app.title.clone(),
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Enter your OpenRouter API key:"),
        Line::from(Span::styled(
            shown.clone(),
            Style::default().fg(theme.highlight),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Enter  continue    Ctrl+Q  quit",
            Style::default().fg(theme.muted),
        )),
    ];
    if app.sessions.is_active() {
        lines.push(Line::from(Span::styled(
            "Esc  back to the conversation",
            Style::default().fg(theme.muted),
        )));
    }
    lines.push(Line::from(Span::styled(
        "The key is stored in ~/.config/philo/credential.toml",
        Style::default().fg(theme.muted),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(" API key ");

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);

    // Cursor sits after the masked key (row 4 inside the border)
    let x = area.x + 1 + shown.width() as u16;
    let y = area.y + 4;
    if x < area.right() && y < area.bottom() {
        f.set_cursor_position(Position::new(x, y));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat screen
// ─────────────────────────────────────────────────────────────────────────────

fn input_height(input: &TextInput) -> u16 {
    (input.line_count() as u16 + 2).min(MAX_INPUT_HEIGHT)
}

fn draw_chat(f: &mut Frame, app: &mut App) {
    let mut constraints = vec![
        Constraint::Length(3), // Title bar
        Constraint::Min(3),    // Transcript
        Constraint::Length(input_height(&app.chat_input)),
    ];
    if app.show_logs {
        constraints.push(Constraint::Length(LOG_PANEL_HEIGHT));
    }
    constraints.push(Constraint::Length(3)); // Status bar

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    render_title(f, chunks[0], app);
    render_transcript(f, chunks[1], app);
    draw_input(f, chunks[2], app);
    if app.show_logs {
        render_logs_panel(f, chunks[3], app);
    }
    render_status(f, chunks[chunks.len() - 1], app);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let busy = app.is_busy();
    let bp = Breakpoint::from_width(area.width);

    let title = if busy {
        format!(" {} Waiting for reply… ", app.spinner_char())
    } else if bp.at_least(Breakpoint::Normal) {
        " Message (Enter send, Shift+Enter newline) ".to_string()
    } else {
        " Message ".to_string()
    };

    let border = if busy { theme.border } else { theme.border_focused };
    let text_style = if busy {
        Style::default().fg(theme.muted)
    } else {
        Style::default().fg(theme.fg)
    };

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    // Scroll so the cursor stays inside the box
    let (row, col) = app.chat_input.cursor_position();
    let col_width = app
        .chat_input
        .value()
        .split('\n')
        .nth(row)
        .map(|line| line.chars().take(col).collect::<String>().width())
        .unwrap_or(0) as u16;
    let row = row as u16;
    let scroll_y = row.saturating_sub(inner_height.saturating_sub(1));
    let scroll_x = col_width.saturating_sub(inner_width.saturating_sub(1));

    let paragraph = Paragraph::new(app.chat_input.value().to_string())
        .style(text_style)
        .scroll((scroll_y, scroll_x))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
    f.render_widget(paragraph, area);

    if !busy && app.modal.is_none() {
        f.set_cursor_position(Position::new(
            area.x + 1 + col_width - scroll_x,
            area.y + 1 + row - scroll_y,
        ));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Modals
// ─────────────────────────────────────────────────────────────────────────────

fn modal_lines(modal: Modal, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if modal == Modal::Help {
        let key_width = HELP_KEYS.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
        for (key, description) in HELP_KEYS {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<width$}", key, width = key_width + 2),
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*description),
            ]));
        }
        lines.push(Line::default());
    }

    lines.extend(
        modal
            .body()
            .iter()
            .map(|text| Line::from(Span::styled(*text, Style::default().fg(theme.fg)))),
    );
    lines
}

fn draw_modal(f: &mut Frame, modal: Modal, theme: &Theme) {
    let lines = modal_lines(modal, theme);
    let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 6;
    let height = lines.len() as u16 + 2;
    let area = centered_rect(width, height, f.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(modal.title())
        .style(Style::default().bg(theme.bg));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}
