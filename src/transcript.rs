//! Transcript store - the ordered, append-only message log of one session
//!
//! Durable messages and UI-only pending placeholders share one id space
//! (`EntryId`) so the view can address either without string lookups.
//! Placeholders never show up in `messages()`, so they never reach the
//! completion request or an export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name (`user` / `assistant`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Speaker label shown above each message
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Human",
            Role::Assistant => "AI",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle for one rendered entry, durable or pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// A durable transcript message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One row of the rendered transcript, in display order
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Message(&'a Message),
    Pending,
}

/// Ordered message log plus transient placeholders
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<(EntryId, Message)>,
    pending: Vec<EntryId>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a durable message stamped with the current time
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> EntryId {
        let id = self.allocate_id();
        self.messages.push((id, Message::new(role, content)));
        id
    }

    /// Add a loading placeholder; it is displayed but never durable
    pub fn push_pending(&mut self) -> EntryId {
        let id = self.allocate_id();
        self.pending.push(id);
        id
    }

    /// Remove a placeholder by id. Unknown ids and durable ids are ignored.
    pub fn remove_pending(&mut self, id: EntryId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| *p != id);
        before != self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of durable messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Number of rendered rows (durable messages plus placeholders)
    pub fn display_len(&self) -> usize {
        self.messages.len() + self.pending.len()
    }

    /// Durable messages in chronological order
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.iter().map(|(_, m)| m)
    }

    /// Rendered rows: durable messages first, then any placeholders
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.messages
            .iter()
            .map(|(_, message)| Entry::Message(message))
            .chain(self.pending.iter().map(|_| Entry::Pending))
    }

    /// Owned copy of the durable messages
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages().cloned().collect()
    }

    pub fn last_from(&self, role: Role) -> Option<&Message> {
        self.messages().rev().find(|m| m.role == role)
    }
}
