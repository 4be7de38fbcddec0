// Modal system for TUI overlays
//
// Self-contained modal dialogs that handle their own input and return actions.
// App just holds Option<Modal>; the caller acts on the returned ModalAction.

use crossterm::event::KeyCode;

/// Actions returned by modal input handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    /// Close the modal
    Close,
    /// Download the conversation, then start a new session
    DownloadThenNewSession,
    /// Start a new session without downloading
    NewSession,
    /// Download the conversation, then exit
    DownloadThenQuit,
    /// Exit without downloading
    Quit,
}

/// Key bindings listed in the help modal
pub const HELP_KEYS: &[(&str, &str)] = &[
    ("Enter", "send message"),
    ("Shift+Enter", "new line (also Alt+Enter, Ctrl+J)"),
    ("Ctrl+S", "download conversation as JSON"),
    ("Ctrl+N", "start a new session"),
    ("Ctrl+K", "change API key"),
    ("Ctrl+Y", "copy last reply"),
    ("PgUp/PgDn", "scroll conversation"),
    ("End", "jump to latest message"),
    ("F2", "toggle log panel"),
    ("Ctrl+Q", "quit"),
];

/// Available modal types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    /// Keyboard shortcuts
    Help,
    /// "Download the current conversation before starting a new one?"
    ConfirmNewSession,
    /// "Quit and lose the current conversation?"
    ConfirmQuit,
}

impl Modal {
    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Enter => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            },
            Modal::ConfirmNewSession => match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => ModalAction::DownloadThenNewSession,
                KeyCode::Char('n') | KeyCode::Char('N') => ModalAction::NewSession,
                KeyCode::Esc => ModalAction::Close,
                _ => ModalAction::None,
            },
            Modal::ConfirmQuit => match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => ModalAction::Quit,
                KeyCode::Char('s') | KeyCode::Char('S') => ModalAction::DownloadThenQuit,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ModalAction::Close,
                _ => ModalAction::None,
            },
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Modal::Help => " Help ",
            Modal::ConfirmNewSession => " New session ",
            Modal::ConfirmQuit => " Quit ",
        }
    }

    /// Body text lines (the help modal adds `HELP_KEYS` above these)
    pub fn body(&self) -> &'static [&'static str] {
        match self {
            Modal::Help => &["Esc to close"],
            Modal::ConfirmNewSession => &[
                "Download the current conversation first?",
                "",
                "y  download, then start fresh",
                "n  start fresh without downloading",
                "Esc  cancel",
            ],
            Modal::ConfirmQuit => &[
                "This conversation has not been downloaded",
                "and will be lost.",
                "",
                "y  quit anyway",
                "s  download, then quit",
                "n  keep chatting",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_closes_on_escape() {
        assert_eq!(Modal::Help.handle_input(KeyCode::Esc), ModalAction::Close);
        assert_eq!(Modal::Help.handle_input(KeyCode::Char('x')), ModalAction::None);
    }

    #[test]
    fn test_confirm_new_session_choices() {
        let modal = Modal::ConfirmNewSession;
        assert_eq!(
            modal.handle_input(KeyCode::Char('y')),
            ModalAction::DownloadThenNewSession
        );
        assert_eq!(modal.handle_input(KeyCode::Char('n')), ModalAction::NewSession);
        assert_eq!(modal.handle_input(KeyCode::Esc), ModalAction::Close);
        assert_eq!(modal.handle_input(KeyCode::Enter), ModalAction::None);
    }

    #[test]
    fn test_confirm_quit_requires_explicit_choice() {
        let modal = Modal::ConfirmQuit;
        assert_eq!(modal.handle_input(KeyCode::Char('y')), ModalAction::Quit);
        assert_eq!(modal.handle_input(KeyCode::Char('s')), ModalAction::DownloadThenQuit);
        assert_eq!(modal.handle_input(KeyCode::Esc), ModalAction::Close);
        // Enter is not a confirmation
        assert_eq!(modal.handle_input(KeyCode::Enter), ModalAction::None);
    }
}
