// Text input editing and key classification
//
// `TextInput` is a small multi-line editor used for both the key field and
// the message box. The cursor is a char index into the buffer, so editing
// never splits a UTF-8 sequence.
//
// `editor_action` decides what a key means to an editor. Enter submits;
// Shift+Enter inserts a newline. Many terminals cannot report Shift+Enter
// (it arrives as plain Enter unless keyboard enhancement is active), so
// Alt+Enter and Ctrl+J also insert a newline.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press means to a text editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Submit,
    Newline,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Classify a key event for text editing; `None` if it isn't an editing key
pub fn editor_action(key: &KeyEvent) -> Option<EditorAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Enter if shift || alt => Some(EditorAction::Newline),
        KeyCode::Enter => Some(EditorAction::Submit),
        KeyCode::Char('j') if ctrl => Some(EditorAction::Newline),
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(EditorAction::Insert(c)),
        KeyCode::Backspace => Some(EditorAction::Backspace),
        KeyCode::Delete => Some(EditorAction::Delete),
        KeyCode::Left => Some(EditorAction::Left),
        KeyCode::Right => Some(EditorAction::Right),
        KeyCode::Home => Some(EditorAction::Home),
        KeyCode::End => Some(EditorAction::End),
        _ => None,
    }
}

/// Editable text buffer with a cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    buffer: String,
    /// Cursor position in chars (0..=char count)
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input holding `value`, cursor at the end
    pub fn with_value(value: impl Into<String>) -> Self {
        let buffer = value.into();
        let cursor = buffer.chars().count();
        Self { buffer, cursor }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::with_value(value);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Apply an editing action. `Submit` is not an edit and is ignored here.
    pub fn apply(&mut self, action: EditorAction) {
        match action {
            EditorAction::Submit => {}
            EditorAction::Newline => self.insert('\n'),
            EditorAction::Insert(c) => self.insert(c),
            EditorAction::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            }
            EditorAction::Delete => {
                if self.cursor < self.char_count() {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            }
            EditorAction::Left => self.cursor = self.cursor.saturating_sub(1),
            EditorAction::Right => self.cursor = (self.cursor + 1).min(self.char_count()),
            EditorAction::Home => self.cursor = self.line_start(),
            EditorAction::End => self.cursor = self.line_end(),
        }
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    /// Cursor as (row, column-in-chars) within the logical lines
    pub fn cursor_position(&self) -> (usize, usize) {
        let before: String = self.buffer.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, col)
    }

    /// Number of logical lines (an empty buffer is one line)
    pub fn line_count(&self) -> usize {
        self.buffer.split('\n').count()
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    fn line_start(&self) -> usize {
        let chars: Vec<char> = self.buffer.chars().collect();
        let mut i = self.cursor;
        while i > 0 && chars[i - 1] != '\n' {
            i -= 1;
        }
        i
    }

    fn line_end(&self) -> usize {
        let chars: Vec<char> = self.buffer.chars().collect();
        let mut i = self.cursor;
        while i < chars.len() && chars[i] != '\n' {
            i += 1;
        }
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.apply(EditorAction::Insert(c));
        }
    }

    #[test]
    fn test_enter_submits() {
        assert_eq!(
            editor_action(&key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(EditorAction::Submit)
        );
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        assert_eq!(
            editor_action(&key(KeyCode::Enter, KeyModifiers::SHIFT)),
            Some(EditorAction::Newline)
        );
        assert_eq!(
            editor_action(&key(KeyCode::Enter, KeyModifiers::ALT)),
            Some(EditorAction::Newline)
        );
        assert_eq!(
            editor_action(&key(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            Some(EditorAction::Newline)
        );
    }

    #[test]
    fn test_control_chords_are_not_text() {
        assert_eq!(editor_action(&key(KeyCode::Char('s'), KeyModifiers::CONTROL)), None);
        assert_eq!(
            editor_action(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(EditorAction::Insert('A'))
        );
    }

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut input = TextInput::new();
        type_str(&mut input, "héllo");
        input.apply(EditorAction::Left);
        input.apply(EditorAction::Left);
        input.apply(EditorAction::Left);
        input.apply(EditorAction::Backspace);
        assert_eq!(input.value(), "hllo");

        input.apply(EditorAction::Insert('é'));
        assert_eq!(input.value(), "héllo");
        input.apply(EditorAction::Delete);
        assert_eq!(input.value(), "hélo");
    }

    #[test]
    fn test_newline_and_cursor_position() {
        let mut input = TextInput::new();
        type_str(&mut input, "ab");
        input.apply(EditorAction::Newline);
        type_str(&mut input, "cde");

        assert_eq!(input.value(), "ab\ncde");
        assert_eq!(input.line_count(), 2);
        assert_eq!(input.cursor_position(), (1, 3));

        input.apply(EditorAction::Home);
        assert_eq!(input.cursor_position(), (1, 0));
        input.apply(EditorAction::Left);
        assert_eq!(input.cursor_position(), (0, 2));
        input.apply(EditorAction::Home);
        input.apply(EditorAction::End);
        assert_eq!(input.cursor_position(), (0, 2));
    }

    #[test]
    fn test_edits_at_bounds_are_noops() {
        let mut input = TextInput::with_value("x");
        input.apply(EditorAction::Delete);
        input.apply(EditorAction::Right);
        assert_eq!(input.value(), "x");

        input.apply(EditorAction::Home);
        input.apply(EditorAction::Backspace);
        input.apply(EditorAction::Left);
        assert_eq!(input.value(), "x");
        assert_eq!(input.cursor_position(), (0, 0));
    }

    #[test]
    fn test_set_and_clear() {
        let mut input = TextInput::new();
        input.set("sk-or-v1");
        assert_eq!(input.cursor_position(), (0, 8));
        input.clear();
        assert!(input.is_empty());
        assert_eq!(input.line_count(), 1);
    }
}
