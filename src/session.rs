// Session management
//
// A session is the metadata wrapper around one transcript: an id, a start
// time and the model it talks to. Only one session is active at a time.
// Starting a new one replaces the whole `ChatState` rather than clearing it
// in place, so nothing from the old conversation can leak into the new one.
//
// State machine:
//   NoSession --start_session--> Active
//   Active    --start_session--> Active (previous ended as Superseded)
//   Active    --end_session----> NoSession (Closed on exit)

use crate::transcript::Transcript;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence so ids stay unique even within the same millisecond
static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Opaque session identifier
///
/// Format: `<unix-millis>-<seq>`, e.g. "1735689600123-0"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let seq = SESSION_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}-{}", Utc::now().timestamp_millis(), seq))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable session metadata (serialized as the `session` object of an export)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    pub model: String,
}

impl Session {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            start_time: Utc::now(),
            model: model.into(),
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// A new session replaced it
    Superseded,
    /// The application is exiting
    Closed,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superseded => write!(f, "superseded"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Everything that belongs to the active conversation
#[derive(Debug)]
pub struct ChatState {
    pub session: Session,
    pub transcript: Transcript,
    /// Increments with every session start; tags in-flight completions
    pub generation: u64,
}

/// Owns the active `ChatState` and its replacement lifecycle
#[derive(Debug)]
pub struct SessionManager {
    model: String,
    current: Option<ChatState>,
    generation: u64,
}

impl SessionManager {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            current: None,
            generation: 0,
        }
    }

    /// Model id stamped onto new sessions
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ChatState> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut ChatState> {
        self.current.as_mut()
    }

    /// Start a fresh session, ending the current one (if any) as superseded
    pub fn start_session(&mut self) -> &mut ChatState {
        self.end_session(EndReason::Superseded);

        self.generation += 1;
        let session = Session::new(self.model.clone());
        tracing::info!(
            session_id = %session.id,
            model = %session.model,
            "Session started"
        );

        self.current.insert(ChatState {
            session,
            transcript: Transcript::new(),
            generation: self.generation,
        })
    }

    /// End the active session and hand back its final state
    pub fn end_session(&mut self, reason: EndReason) -> Option<ChatState> {
        let ended = self.current.take()?;
        tracing::info!(
            session_id = %ended.session.id,
            messages = ended.transcript.len(),
            %reason,
            "Session ended"
        );
        Some(ended)
    }
}
