//! Clipboard helper for copying replies to the system clipboard
//!
//! Uses `arboard` for cross-platform support. The clipboard is opened per
//! copy so no handle outlives the action.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Copy text to the system clipboard
///
/// Fails when there is no display server (headless Linux, SSH without
/// forwarding) or access is denied.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    tracing::debug!(chars = text.chars().count(), "Copied to clipboard");
    Ok(())
}
