// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - The event loop (keyboard/mouse input, timer ticks, completion results)
// - Routing keys to modals, global shortcuts and the current screen
// - Running completion calls on background tasks

pub mod app;
pub mod clipboard;
pub mod components;
pub mod input;
pub mod layout;
pub mod markdown;
pub mod modal;
pub mod scroll;
pub mod theme;
pub mod ui;

use crate::completion::CompletionBackend;
use anyhow::{Context, Result};
use app::{App, CompletionOutcome, PendingRequest, Screen, SubmitOutcome};
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use input::{editor_action, EditorAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Lines moved per arrow key / mouse wheel notch
const SCROLL_STEP: usize = 3;

/// Run the TUI
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// when done (also when the loop fails).
pub async fn run_tui(mut app: App, backend: Arc<dyn CompletionBackend>) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    // Bracketed paste delivers a paste as one event, so its newlines
    // don't arrive as Enter presses
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("Failed to setup terminal")?;

    // Lets terminals that support it report Shift+Enter distinctly
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .context("Failed to enable keyboard enhancement")?;
    }
    tracing::debug!(enhanced_keys, "Terminal initialized");

    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app, backend).await;

    // Restore terminal: every step runs even if an earlier one failed
    let restored = first_failure([
        (
            "keyboard mode",
            if enhanced_keys {
                execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            } else {
                Ok(())
            },
        ),
        ("raw mode", disable_raw_mode()),
        (
            "screen",
            execute!(
                terminal.backend_mut(),
                LeaveAlternateScreen,
                DisableBracketedPaste,
                DisableMouseCapture
            ),
        ),
        ("cursor", terminal.show_cursor()),
    ]);

    result.and(restored)
}

/// Log every failed step and return the first failure
fn first_failure<const N: usize>(steps: [(&str, io::Result<()>); N]) -> Result<()> {
    let mut first = None;
    for (step, outcome) in steps {
        if let Err(e) = outcome {
            tracing::error!(step, error = %e, "Terminal restore step failed");
            first.get_or_insert_with(|| {
                anyhow::Error::new(e).context(format!("Failed to restore {}", step))
            });
        }
    }
    first.map_or(Ok(()), Err)
}

/// Main event loop
///
/// Waits on three sources with tokio::select!:
/// 1. Terminal input (keys, mouse wheel)
/// 2. Timer ticks (spinner animation, toast expiry)
/// 3. Completion results from background tasks
///
/// Each handler runs to completion before the next event is taken.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: Arc<dyn CompletionBackend>,
) -> Result<()> {
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<CompletionOutcome>(16);
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard or mouse input
            input = async {
                match event::poll(Duration::from_millis(10)) {
                    Ok(true) => event::read().map(Some),
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                }
            } => {
                let request = match input.context("Failed to read terminal input")? {
                    Some(Event::Key(key)) => handle_key_event(app, key),
                    Some(Event::Paste(text)) => {
                        handle_paste(app, &text);
                        None
                    }
                    Some(Event::Mouse(mouse)) => {
                        match mouse.kind {
                            MouseEventKind::ScrollUp => app.scroll.scroll_up(SCROLL_STEP),
                            MouseEventKind::ScrollDown => app.scroll.scroll_down(SCROLL_STEP),
                            _ => {}
                        }
                        None
                    }
                    _ => None,
                };
                if let Some(request) = request {
                    spawn_completion(backend.clone(), outcome_tx.clone(), request);
                }
            }

            _ = tick_interval.tick() => {
                app.tick();
            }

            Some(outcome) = outcome_rx.recv() => {
                app.finish_completion(outcome);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Run one completion call and tag the result with its origin
pub(crate) async fn run_completion(
    backend: &dyn CompletionBackend,
    request: PendingRequest,
) -> CompletionOutcome {
    let result = backend.complete(&request.messages, &request.api_key).await;
    CompletionOutcome {
        generation: request.generation,
        pending_id: request.pending_id,
        result,
    }
}

/// Run the call on a background task; the result comes back over `tx`
fn spawn_completion(
    backend: Arc<dyn CompletionBackend>,
    tx: mpsc::Sender<CompletionOutcome>,
    request: PendingRequest,
) {
    tokio::spawn(async move {
        let outcome = run_completion(backend.as_ref(), request).await;
        if tx.send(outcome).await.is_err() {
            tracing::debug!("UI closed before completion arrived");
        }
    });
}

/// Handle keyboard input
/// Layered dispatch: Modal → Global → Screen. Returns a request to send, if any.
pub(crate) fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<PendingRequest> {
    // Windows reports releases too
    if key.kind == KeyEventKind::Release {
        return None;
    }

    // Layer 1: Modal captures all input when active
    if let Some(modal) = app.modal {
        let action = modal.handle_input(key.code);
        app.handle_modal_action(action);
        return None;
    }

    // Layer 2: Global keys (work on every screen)
    if handle_global_keys(app, &key) {
        return None;
    }

    // Layer 3: Screen-specific keys
    match app.screen {
        Screen::Setup => {
            handle_setup_keys(app, &key);
            None
        }
        Screen::Chat => handle_chat_keys(app, &key),
    }
}

/// Pasted text goes to the active input; a modal swallows it
pub(crate) fn handle_paste(app: &mut App, text: &str) {
    if app.modal.is_none() {
        app.paste(text);
    }
}

/// Handle global keys - returns true if handled
fn handle_global_keys(app: &mut App, key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => app.request_quit(),
        KeyCode::F(1) => app.open_help(),
        KeyCode::F(2) => app.toggle_logs(),
        _ => return false,
    }
    true
}

fn handle_setup_keys(app: &mut App, key: &KeyEvent) {
    if key.code == KeyCode::Esc {
        app.cancel_change_key();
        return;
    }

    match editor_action(key) {
        Some(EditorAction::Submit) => {
            app.submit_key();
        }
        // The key is a single line
        Some(EditorAction::Newline) | None => {}
        Some(action) => app.key_input.apply(action),
    }
}

fn handle_chat_keys(app: &mut App, key: &KeyEvent) -> Option<PendingRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('s') if ctrl => {
            app.download();
            return None;
        }
        KeyCode::Char('n') if ctrl => {
            app.request_new_session();
            return None;
        }
        KeyCode::Char('k') if ctrl => {
            app.change_key();
            return None;
        }
        KeyCode::Char('y') if ctrl => {
            app.copy_last_reply();
            return None;
        }
        KeyCode::PageUp => {
            app.scroll.page_up();
            return None;
        }
        KeyCode::PageDown => {
            app.scroll.page_down();
            return None;
        }
        KeyCode::Up => {
            app.scroll.scroll_up(1);
            return None;
        }
        KeyCode::Down => {
            app.scroll.scroll_down(1);
            return None;
        }
        KeyCode::End => {
            // Also moves the cursor to the end of the line below
            app.scroll.scroll_to_bottom();
        }
        _ => {}
    }

    match editor_action(key)? {
        EditorAction::Submit => match app.submit_message() {
            SubmitOutcome::Sent(request) => Some(request),
            SubmitOutcome::Busy => {
                app.show_toast("Waiting for the current reply");
                None
            }
            SubmitOutcome::Empty | SubmitOutcome::NoSession => None,
        },
        action => {
            app.edit_message(action);
            None
        }
    }
}
