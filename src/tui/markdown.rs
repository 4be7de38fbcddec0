// Markdown rendering for assistant replies
//
// Uses pulldown-cmark to walk the markdown event stream and builds styled,
// pre-wrapped ratatui Lines. Wrapping happens here (not in the Paragraph
// widget) so the transcript pane knows the exact rendered height of every
// message for follow-mode scrolling.
//
// Supports: headings, paragraphs, bold, italic, strikethrough, inline code,
// fenced code blocks, ordered/unordered (nested) lists, blockquotes, rules,
// links and task list markers. Raw HTML is shown as literal text.

use super::theme::Theme;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Parse markdown and convert directly to wrapped Lines
///
/// Input is sanitized first so control characters in a reply can't move the
/// terminal cursor.
pub fn render_markdown(markdown: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let sanitized = sanitize_for_tui(markdown);
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut renderer = Renderer::new(width.max(1), theme);
    for event in Parser::new_ext(&sanitized, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

/// Wrap plain text (no markdown) to `width`, keeping explicit newlines
pub fn wrap_plain(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    sanitize_for_tui(text)
        .split('\n')
        .flat_map(|line| wrap_text(line, width.max(1)))
        .map(|line| Line::from(Span::styled(line, style)))
        .collect()
}

/// Line-building state while walking the event stream
struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    /// Display width of the current line
    col: usize,
    /// True once the current line holds more than its indent
    has_content: bool,
    /// Prefix for every new line (list continuation, quote bars)
    indent: String,
    /// Indent lengths to restore when a list item or quote closes
    indent_stack: Vec<usize>,
    styles: Vec<Style>,
    /// Next number per open list; `None` for bullet lists
    lists: Vec<Option<u64>>,
    code_block: Option<String>,
    /// Open link: (url, text seen so far)
    link: Option<(String, String)>,
}

impl<'t> Renderer<'t> {
    fn new(width: usize, theme: &'t Theme) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            col: 0,
            has_content: false,
            indent: String::new(),
            indent_stack: Vec::new(),
            styles: vec![Style::default().fg(theme.fg)],
            lists: Vec::new(),
            code_block: None,
            link: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let next = f(self.style());
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),

            Event::Text(text) => {
                if let Some(code) = self.code_block.as_mut() {
                    code.push_str(&text);
                    return;
                }
                if let Some((_, link_text)) = self.link.as_mut() {
                    link_text.push_str(&text);
                }
                self.push_text(&text, self.style());
            }

            Event::Code(code) => {
                let style = Style::default()
                    .fg(self.theme.code_fg)
                    .bg(self.theme.code_bg);
                self.push_text(&code, style);
            }

            Event::Html(html) | Event::InlineHtml(html) => {
                let style = Style::default().fg(self.theme.muted);
                for (i, part) in html.split('\n').enumerate() {
                    if i > 0 {
                        self.flush();
                    }
                    self.push_text(part, style);
                }
            }

            Event::SoftBreak => self.push_text(" ", self.style()),
            Event::HardBreak => self.flush(),

            Event::Rule => {
                self.flush();
                let rule = "─".repeat(self.width.min(40));
                self.lines
                    .push(Line::from(Span::styled(rule, Style::default().fg(self.theme.border))));
                self.blank_line();
            }

            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_text(marker, Style::default().fg(self.theme.muted));
            }

            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush();
                let color = self.theme.heading;
                self.push_style(|s| s.fg(color).add_modifier(Modifier::BOLD));
            }

            Tag::BlockQuote => {
                self.flush();
                self.indent_stack.push(self.indent.len());
                self.indent.push_str("│ ");
                let color = self.theme.quote;
                self.push_style(|s| s.fg(color).add_modifier(Modifier::ITALIC));
            }

            Tag::CodeBlock(_) => {
                self.flush();
                self.code_block = Some(String::new());
            }

            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }

            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{}. ", number);
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.begin_line();
                self.col += marker.width();
                self.spans
                    .push(Span::styled(marker.clone(), Style::default().fg(self.theme.border)));
                self.indent_stack.push(self.indent.len());
                self.indent.push_str(&" ".repeat(marker.width()));
            }

            Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT)),

            Tag::Link { dest_url, .. } => {
                self.link = Some((dest_url.to_string(), String::new()));
                let color = self.theme.link;
                self.push_style(|s| s.fg(color).add_modifier(Modifier::UNDERLINED));
            }

            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                // Tight list items carry no paragraphs; loose ones get spacing
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }

            TagEnd::Heading(_) => {
                self.pop_style();
                self.flush();
                self.blank_line();
            }

            TagEnd::BlockQuote => {
                self.pop_style();
                self.flush();
                self.restore_indent();
                self.blank_line();
            }

            TagEnd::CodeBlock => {
                let code = self.code_block.take().unwrap_or_default();
                let style = Style::default()
                    .fg(self.theme.code_fg)
                    .bg(self.theme.code_bg);
                let room = self.width.saturating_sub(self.indent.width() + 2);
                for line in code.trim_end_matches('\n').split('\n') {
                    for part in break_by_width(line, room) {
                        self.lines.push(Line::from(vec![
                            Span::raw(self.indent.clone()),
                            Span::styled(format!("  {}", part), style),
                        ]));
                    }
                }
                self.blank_line();
            }

            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }

            TagEnd::Item => {
                self.flush();
                self.restore_indent();
            }

            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => self.pop_style(),

            TagEnd::Link => {
                self.pop_style();
                if let Some((url, text)) = self.link.take() {
                    if !url.is_empty() && text != url {
                        self.push_text(&format!(" ({})", url), Style::default().fg(self.theme.muted));
                    }
                }
            }

            _ => {}
        }
    }

    /// Append text with word wrapping; whitespace runs collapse to one space
    fn push_text(&mut self, text: &str, style: Style) {
        for piece in split_runs(text) {
            if piece.starts_with(char::is_whitespace) {
                // Leading spaces at a line start are dropped
                if self.has_content && self.col < self.width {
                    self.spans.push(Span::styled(" ", style));
                    self.col += 1;
                }
                continue;
            }

            let piece_width = piece.width();
            if self.has_content && self.col + piece_width > self.width {
                // Drop the trailing space before breaking
                if self.spans.last().map(|s| s.content == " ").unwrap_or(false) {
                    self.spans.pop();
                }
                self.flush();
            }
            self.begin_line();
            if self.col + piece_width > self.width {
                self.push_long_word(piece, style);
                continue;
            }
            self.spans.push(Span::styled(piece.to_string(), style));
            self.col += piece_width;
            self.has_content = true;
        }
    }

    /// A word wider than the line: break it by display width
    fn push_long_word(&mut self, word: &str, style: Style) {
        let mut chunk = String::new();
        for ch in word.chars() {
            let w = ch.width().unwrap_or(0);
            if self.col + w > self.width && (self.has_content || !chunk.is_empty()) {
                if !chunk.is_empty() {
                    self.spans.push(Span::styled(std::mem::take(&mut chunk), style));
                    self.has_content = true;
                }
                self.flush();
                self.begin_line();
            }
            chunk.push(ch);
            self.col += w;
        }
        if !chunk.is_empty() {
            self.spans.push(Span::styled(chunk, style));
            self.has_content = true;
        }
    }

    /// Start a new line with the current indent if nothing is on it yet
    fn begin_line(&mut self) {
        if self.spans.is_empty() && !self.indent.is_empty() {
            self.spans.push(Span::styled(
                self.indent.clone(),
                Style::default().fg(self.theme.border),
            ));
            self.col = self.indent.width();
        }
    }

    fn flush(&mut self) {
        if self.has_content || !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
        self.col = 0;
        self.has_content = false;
    }

    fn blank_line(&mut self) {
        if self.lines.last().map(|l| l.width() > 0).unwrap_or(false) {
            self.lines.push(Line::default());
        }
    }

    fn restore_indent(&mut self) {
        let len = self.indent_stack.pop().unwrap_or(0);
        self.indent.truncate(len);
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().map(|l| l.width() == 0).unwrap_or(false) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Split text into alternating runs of whitespace and non-whitespace
fn split_runs(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let in_space = rest.starts_with(char::is_whitespace);
        let split = rest
            .find(|c: char| c.is_whitespace() != in_space)
            .unwrap_or(rest.len());
        let (piece, tail) = rest.split_at(split);
        rest = tail;
        Some(piece)
    })
}

/// Break text into pieces no wider than `width`, ignoring word boundaries
///
/// Always yields at least one piece (empty input gives one empty piece).
fn break_by_width(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += w;
    }
    pieces.push(current);
    pieces
}

/// Wrap one line of plain text to `width`, breaking at word boundaries
///
/// Whitespace is kept as typed (indentation, runs of spaces); only the run
/// where a break falls is dropped. Words wider than the line are broken by
/// display width so nothing is clipped.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for piece in split_runs(text) {
        let piece_width = piece.width();
        if current_width + piece_width <= width {
            current.push_str(piece);
            current_width += piece_width;
            continue;
        }

        if piece.starts_with(char::is_whitespace) {
            if !current.is_empty() {
                result.push(std::mem::take(&mut current));
                current_width = 0;
            }
            continue;
        }

        // Move the word to a fresh line unless the line holds only indentation
        if !current.trim().is_empty() {
            result.push(current.trim_end().to_string());
            current.clear();
            current_width = 0;
        }
        if current_width + piece_width <= width {
            current.push_str(piece);
            current_width += piece_width;
            continue;
        }

        for ch in piece.chars() {
            let w = ch.width().unwrap_or(0);
            if current_width + w > width && current_width > 0 {
                result.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += w;
        }
    }

    if !current.is_empty() || result.is_empty() {
        result.push(current);
    }
    result
}

/// Strip control characters that can cause TUI rendering artifacts
///
/// Removes carriage returns, backspace/delete, ANSI escape sequences and
/// other ASCII control characters (tab becomes four spaces, newline stays).
fn sanitize_for_tui(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\x1b' => {
                // ESC [ <params> <letter>
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\t' => result.push_str("    "),
            '\n' => result.push('\n'),
            c if c.is_ascii_control() => {}
            _ => result.push(ch),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render(md: &str, width: usize) -> Vec<String> {
        text_of(&render_markdown(md, width, &Theme::default()))
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        let lines = render("the quick brown fox jumps over the lazy dog", 12);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width() <= 12, "line too wide: {:?}", line);
        }
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_bold_is_styled_not_starred() {
        let lines = render_markdown("say **hello** now", 80, &Theme::default());
        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "hello")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(text_of(&lines), vec!["say hello now"]);
    }

    #[test]
    fn test_lists_get_markers() {
        let lines = render("- one\n- two\n\n1. first\n2. second", 40);
        assert_eq!(lines, vec!["• one", "• two", "", "1. first", "2. second"]);
    }

    #[test]
    fn test_nested_list_indents() {
        let lines = render("- outer\n  - inner", 40);
        assert_eq!(lines, vec!["• outer", "  • inner"]);
    }

    #[test]
    fn test_code_block_keeps_lines() {
        let lines = render("```rust\nfn main() {\n    run();\n}\n```", 40);
        assert_eq!(lines, vec!["  fn main() {", "      run();", "  }"]);
    }

    #[test]
    fn test_heading_then_paragraph() {
        let lines = render("# Title\n\nBody text", 40);
        assert_eq!(lines, vec!["Title", "", "Body text"]);
    }

    #[test]
    fn test_link_shows_url() {
        let lines = render("see [docs](https://example.com)", 80);
        assert_eq!(lines, vec!["see docs (https://example.com)"]);

        let lines = render("<https://example.com>", 80);
        assert_eq!(lines, vec!["https://example.com"]);
    }

    #[test]
    fn test_inline_html_is_literal() {
        let lines = render("a <b>markup</b> tag", 80);
        assert_eq!(lines, vec!["a <b>markup</b> tag"]);
    }

    #[test]
    fn test_blockquote_prefix() {
        let lines = render("> quoted words", 40);
        assert_eq!(lines, vec!["│ quoted words"]);
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize_for_tui("a\x1b[31mred\x1b[0m\r\n"), "ared\n");
        assert_eq!(sanitize_for_tui("\tx"), "    x");
    }

    #[test]
    fn test_wrap_plain_breaks_long_words() {
        let url = format!("https://example.com/{}END", "a".repeat(60));
        let lines = text_of(&wrap_plain(&url, 40, Style::default()));
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width() <= 40, "line too wide: {:?}", line);
        }
        assert_eq!(lines.concat(), url);
    }

    #[test]
    fn test_wrap_plain_keeps_whitespace_as_typed() {
        let lines = text_of(&wrap_plain("    indented   code", 40, Style::default()));
        assert_eq!(lines, vec!["    indented   code"]);

        let lines = text_of(&wrap_plain("aa bbb", 3, Style::default()));
        assert_eq!(lines, vec!["aa", "bbb"]);
    }

    #[test]
    fn test_markdown_breaks_long_words() {
        let word = "x".repeat(30);
        let lines = render(&format!("see {}", word), 12);
        for line in &lines {
            assert!(line.width() <= 12, "line too wide: {:?}", line);
        }
        assert_eq!(lines.concat(), format!("see{}", word));
    }

    #[test]
    fn test_long_code_line_is_broken_not_clipped() {
        let lines = render(&format!("```\n{}\n```", "y".repeat(20)), 12);
        assert_eq!(lines, vec!["  yyyyyyyyyy", "  yyyyyyyyyy"]);
    }

    #[test]
    fn test_wrap_plain_keeps_newlines() {
        let lines = wrap_plain("line one\n\nline two", 80, Style::default());
        assert_eq!(text_of(&lines), vec!["line one", "", "line two"]);
    }
}
