// Export module - snapshots a session and its transcript to a JSON file
//
// Document shape (field names are relied on by downstream tooling):
//
//   {
//     "session":  { "id": "...", "startTime": "...", "model": "..." },
//     "messages": [ { "role": "user", "content": "...", "timestamp": "..." } ],
//     "endTime":  "..."
//   }
//
// Each session exports to: project-philo-session-<session id>.json
// Example: jq '.messages[].content' project-philo-session-1735689600123-0.json

use crate::session::{ChatState, Session};
use crate::transcript::{Message, Transcript};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FILE_PREFIX: &str = "project-philo-session-";

/// Serialized conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub session: Session,
    pub messages: Vec<Message>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export; surfaced to the user as a notice
    #[error("No messages to download")]
    Empty,

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize conversation: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Snapshot `session` + `transcript`, stamping `endTime` with the current time
pub fn serialize(session: &Session, transcript: &Transcript) -> Result<ExportDocument, ExportError> {
    if transcript.is_empty() {
        return Err(ExportError::Empty);
    }

    Ok(ExportDocument {
        session: session.clone(),
        messages: transcript.snapshot(),
        end_time: Utc::now(),
    })
}

/// Deterministic file name for a session's export
pub fn export_file_name(session: &Session) -> String {
    format!("{}{}.json", FILE_PREFIX, session.id)
}

/// Write `document` as pretty JSON into `dir`, creating the directory if needed
pub fn write_export(dir: &Path, document: &ExportDocument) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(export_file_name(&document.session));
    let json = serde_json::to_string_pretty(document)?;
    fs::write(&path, json).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        messages = document.messages.len(),
        "Conversation exported"
    );
    Ok(path)
}

/// Serialize the active conversation and write it out
///
/// An empty transcript fails with `ExportError::Empty` before touching disk.
pub fn download(state: &ChatState, dir: &Path) -> Result<PathBuf, ExportError> {
    let document = serialize(&state.session, &state.transcript)?;
    write_export(dir, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionManager;
    use crate::transcript::Role;

    fn chat_with(messages: &[(Role, &str)]) -> SessionManager {
        let mut manager = SessionManager::new("qwen/qwen3-coder");
        let state = manager.start_session();
        for (role, content) in messages {
            state.transcript.append(*role, *content);
        }
        manager
    }

    #[test]
    fn test_empty_transcript_is_rejected_and_nothing_written() {
        let dir = tempfile::tempdir().unwrap();
        let manager = chat_with(&[]);
        let state = manager.current().unwrap();

        assert!(matches!(
            serialize(&state.session, &state.transcript),
            Err(ExportError::Empty)
        ));
        assert!(matches!(download(state, dir.path()), Err(ExportError::Empty)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_written_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = chat_with(&[
            (Role::User, "Hi"),
            (Role::Assistant, "Hello! **bold** <b>markup</b>"),
            (Role::User, "line one\nline two"),
        ]);
        let state = manager.current().unwrap();

        let path = download(state, dir.path()).unwrap();
        let parsed: ExportDocument =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(parsed.session, state.session);
        assert_eq!(parsed.messages, state.transcript.snapshot());
        assert!(parsed.end_time >= state.session.start_time);
    }

    #[test]
    fn test_field_names_match_export_format() {
        let manager = chat_with(&[(Role::User, "Hi")]);
        let state = manager.current().unwrap();
        let document = serialize(&state.session, &state.transcript).unwrap();
        let value = serde_json::to_value(&document).unwrap();

        assert!(value["session"]["id"].is_string());
        assert!(value["session"]["startTime"].is_string());
        assert_eq!(value["session"]["model"], "qwen/qwen3-coder");
        assert!(value["endTime"].is_string());
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Hi");
        assert!(value["messages"][0]["timestamp"].is_string());
    }

    #[test]
    fn test_file_name_uses_session_id() {
        let manager = chat_with(&[]);
        let session = &manager.current().unwrap().session;
        assert_eq!(
            export_file_name(session),
            format!("project-philo-session-{}.json", session.id)
        );
    }

    #[test]
    fn test_pending_placeholder_is_not_exported() {
        let mut manager = chat_with(&[(Role::User, "Hi")]);
        let state = manager.current_mut().unwrap();
        state.transcript.push_pending();

        let document = serialize(&state.session, &state.transcript).unwrap();
        assert_eq!(document.messages.len(), 1);
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("chat");
        let manager = chat_with(&[(Role::User, "Hi")]);

        let path = download(manager.current().unwrap(), &nested).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
