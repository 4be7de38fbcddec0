// philo - terminal chat client for OpenRouter-style completion endpoints
//
// The user enters an API key, then chats with a remote model. Every turn
// re-sends the whole conversation; the reply is rendered as markdown and
// the conversation can be downloaded as JSON at any time.
//
// Architecture:
// - Completion client (reqwest): one POST per turn, typed errors
// - Session manager: current session metadata and transcript
// - TUI (ratatui): key screen, chat screen, modals, toasts, log panel
// - Export: JSON snapshot of a session on disk
// - Credential store: the API key between runs
// - Completion calls run on background tasks and report back over mpsc

mod cli;
mod completion;
mod config;
mod credential;
mod export;
mod logging;
mod session;
mod transcript;
mod tui;
mod util;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use completion::{CompletionBackend, CompletionClient, CompletionConfig};
use config::Config;
use credential::{CredentialStore, API_KEY_ENV};
use logging::LogBuffer;
use std::sync::Arc;
use tui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Management subcommands (config, key) run and exit
    if let Some(command) = &cli.command {
        return cli::run_command(&cli, command);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::load().context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    // Logs go to the in-memory buffer (and optionally a file), never the
    // terminal the UI is drawing on
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init_tracing(&config.logging, log_buffer.clone());

    tracing::info!(
        version = config::VERSION,
        model = %config.model,
        export_dir = %config.export_dir.display(),
        "Starting philo"
    );

    let credentials = CredentialStore::default_location();
    let (initial_key, persist_key) = initial_key(credentials.as_ref());

    let backend: Arc<dyn CompletionBackend> = Arc::new(
        CompletionClient::new(CompletionConfig::from(&config))
            .context("Failed to create HTTP client")?,
    );

    let app = App::new(&config, credentials, initial_key, persist_key, log_buffer);
    tui::run_tui(app, backend).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Key to prefill, and whether a submitted key may be written back
///
/// A non-blank PHILO_API_KEY wins for this run and is never persisted.
/// Otherwise the stored credential is used; an unreadable store is logged
/// and treated as empty.
fn initial_key(store: Option<&CredentialStore>) -> (Option<String>, bool) {
    if let Some(key) = std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
    {
        tracing::info!(
            key = %credential::fingerprint(&key),
            "Using API key from {}", API_KEY_ENV
        );
        return (Some(key), false);
    }

    let stored = match store.map(CredentialStore::load).transpose() {
        Ok(key) => key.flatten(),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "Could not read stored API key");
            None
        }
    };

    if let Some(key) = &stored {
        tracing::info!(key = %credential::fingerprint(key), "Loaded stored API key");
    }
    (stored, true)
}
