// TUI application state
//
// `App` is the view controller: it owns the session manager, the two text
// inputs and all UI state, and turns user intent (submit, new session,
// change key, download, quit) into calls on the other components. It never
// touches the network itself; `submit_message` hands back a
// `PendingRequest` for the event loop to run, and the result comes back
// through `finish_completion`.

use super::components::Toast;
use super::input::{EditorAction, TextInput};
use super::modal::{Modal, ModalAction};
use super::scroll::ScrollState;
use super::{clipboard, theme::Theme};
use crate::completion::{to_wire, ChatMessage, CompletionError};
use crate::config::Config;
use crate::credential::{self, CredentialStore};
use crate::export::{self, ExportError};
use crate::logging::LogBuffer;
use crate::session::{ChatState, EndReason, SessionManager};
use crate::transcript::{EntryId, Role};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

/// Spinner frames for the pending placeholder and title bar
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// API key entry
    Setup,
    /// Transcript and message input
    Chat,
}

/// A completion call the event loop should run
#[derive(Clone)]
pub struct PendingRequest {
    pub generation: u64,
    pub pending_id: EntryId,
    pub messages: Vec<ChatMessage>,
    pub api_key: String,
}

// The key stays out of Debug output
impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("generation", &self.generation)
            .field("pending_id", &self.pending_id)
            .field("messages", &self.messages.len())
            .field("api_key", &credential::fingerprint(&self.api_key))
            .finish()
    }
}

/// A finished completion call, tagged with the session that issued it
#[derive(Debug)]
pub struct CompletionOutcome {
    pub generation: u64,
    pub pending_id: EntryId,
    pub result: Result<String, CompletionError>,
}

/// Result of a message submission
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Appended and ready to send
    Sent(PendingRequest),
    /// A completion is still outstanding
    Busy,
    /// Nothing but whitespace was entered
    Empty,
    /// No session yet (key not submitted)
    NoSession,
}

/// The one outstanding completion, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    generation: u64,
    pending_id: EntryId,
}

/// Main application state for the TUI
pub struct App {
    pub screen: Screen,
    pub sessions: SessionManager,
    pub theme: Theme,

    /// Key field on the setup screen
    pub key_input: TextInput,
    /// Message box on the chat screen
    pub chat_input: TextInput,

    pub modal: Option<Modal>,
    pub toast: Option<Toast>,
    pub scroll: ScrollState,

    pub show_logs: bool,
    pub log_buffer: LogBuffer,

    pub should_quit: bool,

    /// Title shown in the title bar
    pub title: String,
    export_dir: PathBuf,

    api_key: Option<String>,
    credentials: Option<CredentialStore>,
    /// False when the key came from the environment; it is never written back
    persist_key: bool,

    in_flight: Option<InFlight>,
    animation_frame: usize,
    start_time: Instant,
}

impl App {
    /// `initial_key` prefills the key field (stored credential or env override)
    pub fn new(
        config: &Config,
        credentials: Option<CredentialStore>,
        initial_key: Option<String>,
        persist_key: bool,
        log_buffer: LogBuffer,
    ) -> Self {
        let key_input = initial_key
            .as_deref()
            .map(TextInput::with_value)
            .unwrap_or_default();

        Self {
            screen: Screen::Setup,
            sessions: SessionManager::new(config.model.clone()),
            theme: Theme::default(),
            key_input,
            chat_input: TextInput::new(),
            modal: None,
            toast: None,
            scroll: ScrollState::new(),
            show_logs: false,
            log_buffer,
            should_quit: false,
            title: config.app_title.clone(),
            export_dir: config.export_dir.clone(),
            api_key: None,
            credentials,
            persist_key,
            in_flight: None,
            animation_frame: 0,
            start_time: Instant::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub fn current(&self) -> Option<&ChatState> {
        self.sessions.current()
    }

    /// A completion is outstanding; the message box is read-only
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True when quitting or replacing the session would lose messages
    pub fn has_unsaved_messages(&self) -> bool {
        self.current()
            .map(|state| !state.transcript.is_empty())
            .unwrap_or(false)
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Setup screen
    // ─────────────────────────────────────────────────────────────────────

    /// Accept the key in the key field
    ///
    /// The first accepted key starts the first session. After "change key"
    /// it returns to the existing conversation untouched.
    pub fn submit_key(&mut self) -> bool {
        let key = self.key_input.value().trim().to_string();
        if key.is_empty() {
            self.show_error("Please enter your OpenRouter API key");
            return false;
        }

        if self.persist_key {
            if let Some(store) = &self.credentials {
                if let Err(e) = store.save(&key) {
                    tracing::error!(error = %format!("{:#}", e), "Could not save API key");
                    self.show_error("Could not save API key (kept for this run)");
                }
            }
        }

        tracing::info!(key = %credential::fingerprint(&key), "API key accepted");
        self.api_key = Some(key);

        if !self.sessions.is_active() {
            self.start_new_session();
        }
        self.screen = Screen::Chat;
        true
    }

    /// Back to the key screen, keeping the current session
    pub fn change_key(&mut self) {
        if let Some(key) = &self.api_key {
            self.key_input.set(key.clone());
        }
        self.screen = Screen::Setup;
    }

    /// Leave the key screen without changing the key (only once a session exists)
    pub fn cancel_change_key(&mut self) {
        if self.sessions.is_active() {
            self.screen = Screen::Chat;
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chat turn
    // ─────────────────────────────────────────────────────────────────────

    /// Apply an edit to the message box (ignored while a reply is pending)
    pub fn edit_message(&mut self, action: EditorAction) {
        if !self.is_busy() {
            self.chat_input.apply(action);
        }
    }

    /// Insert pasted text into the active input
    ///
    /// Line breaks survive in the message box; the key field takes a single
    /// line, so they are dropped there.
    pub fn paste(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        match self.screen {
            Screen::Setup => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.key_input.apply(EditorAction::Insert(c));
                }
            }
            Screen::Chat => {
                if self.is_busy() {
                    self.show_toast("Waiting for the current reply");
                    return;
                }
                for c in text.chars() {
                    match c {
                        '\n' => self.chat_input.apply(EditorAction::Newline),
                        c if c.is_control() && c != '\t' => {}
                        c => self.chat_input.apply(EditorAction::Insert(c)),
                    }
                }
            }
        }
    }

    /// Append the typed message and show a placeholder for the reply
    pub fn submit_message(&mut self) -> SubmitOutcome {
        if self.is_busy() {
            return SubmitOutcome::Busy;
        }

        let text = self.chat_input.value().trim().to_string();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }

        let api_key = self.api_key.clone().unwrap_or_default();
        let Some(state) = self.sessions.current_mut() else {
            return SubmitOutcome::NoSession;
        };

        state.transcript.append(Role::User, text);
        let pending_id = state.transcript.push_pending();
        let request = PendingRequest {
            generation: state.generation,
            pending_id,
            messages: to_wire(state.transcript.messages()),
            api_key,
        };

        tracing::debug!(
            session_id = %state.session.id,
            messages = request.messages.len(),
            "Sending completion request"
        );

        self.in_flight = Some(InFlight {
            generation: request.generation,
            pending_id,
        });
        self.chat_input.clear();
        self.scroll.scroll_to_bottom();
        SubmitOutcome::Sent(request)
    }

    /// Replace the placeholder with the reply (or an `Error: ...` message)
    ///
    /// Results issued by an earlier session are dropped.
    pub fn finish_completion(&mut self, outcome: CompletionOutcome) {
        let issued = InFlight {
            generation: outcome.generation,
            pending_id: outcome.pending_id,
        };
        if self.in_flight == Some(issued) {
            self.in_flight = None;
        }

        let Some(state) = self.sessions.current_mut() else {
            tracing::debug!("Completion arrived with no active session; dropped");
            return;
        };

        if state.generation != outcome.generation {
            tracing::info!(
                issued_generation = outcome.generation,
                current_generation = state.generation,
                "Dropping completion from a previous session"
            );
            return;
        }

        state.transcript.remove_pending(outcome.pending_id);
        let content = match outcome.result {
            Ok(content) => content,
            Err(e) => format!("Error: {}", e),
        };
        state.transcript.append(Role::Assistant, content);
        self.scroll.scroll_to_bottom();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session actions
    // ─────────────────────────────────────────────────────────────────────

    /// Start over, first offering to download a non-empty conversation
    pub fn request_new_session(&mut self) {
        if self.has_unsaved_messages() {
            self.modal = Some(Modal::ConfirmNewSession);
        } else {
            self.start_new_session();
        }
    }

    /// Replace the session; any outstanding reply will be dropped on arrival
    pub fn start_new_session(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(
                generation = in_flight.generation,
                "New session while a completion is outstanding"
            );
        }
        self.sessions.start_session();
        self.chat_input.clear();
        self.scroll = ScrollState::new();
    }

    /// Write the conversation to the export directory
    pub fn download(&mut self) -> Option<PathBuf> {
        let result = match self.sessions.current() {
            Some(state) => export::download(state, &self.export_dir),
            None => Err(ExportError::Empty),
        };

        match result {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.show_toast(format!("Saved {}", name));
                Some(path)
            }
            Err(ExportError::Empty) => {
                self.show_toast(ExportError::Empty.to_string());
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Download failed");
                self.show_error(format!("Download failed: {}", e));
                None
            }
        }
    }

    /// Quit, asking first if the conversation would be lost
    pub fn request_quit(&mut self) {
        if self.has_unsaved_messages() {
            self.modal = Some(Modal::ConfirmQuit);
        } else {
            self.quit();
        }
    }

    pub fn quit(&mut self) {
        self.sessions.end_session(EndReason::Closed);
        self.should_quit = true;
    }

    /// Copy the most recent assistant reply to the clipboard
    pub fn copy_last_reply(&mut self) {
        let Some(reply) = self
            .current()
            .and_then(|state| state.transcript.last_from(Role::Assistant))
            .map(|m| m.content.clone())
        else {
            self.show_toast("No reply to copy");
            return;
        };

        match clipboard::copy_to_clipboard(&reply) {
            Ok(()) => self.show_toast("Copied last reply"),
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Clipboard copy failed");
                self.show_error("Failed to copy");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Overlays
    // ─────────────────────────────────────────────────────────────────────

    pub fn open_help(&mut self) {
        self.modal = Some(Modal::Help);
    }

    /// Run the action a modal returned
    pub fn handle_modal_action(&mut self, action: ModalAction) {
        match action {
            ModalAction::None => return,
            ModalAction::Close => {}
            ModalAction::NewSession => self.start_new_session(),
            ModalAction::DownloadThenNewSession => {
                // Keep the conversation if the download failed
                if self.download().is_some() {
                    self.start_new_session();
                }
            }
            ModalAction::Quit => self.quit(),
            ModalAction::DownloadThenQuit => {
                if self.download().is_some() {
                    self.quit();
                }
            }
        }
        self.modal = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::info(message));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::error(message));
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }

    /// Advance animations and expire the toast (called on every tick)
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        if self.toast.as_ref().map(Toast::is_expired).unwrap_or(false) {
            self.toast = None;
        }
    }
}
