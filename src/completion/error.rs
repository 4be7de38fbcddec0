//! Completion failure taxonomy
//!
//! Every variant displays as a single human-readable message; the chat view
//! shows it verbatim after an `Error: ` prefix.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Credential missing or rejected (401/403)
    #[error("{message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// Non-2xx response carrying a structured `error.message`
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Non-2xx response without a structured error body
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Transport failure: DNS, connect, timeout, body read
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx response we could not interpret
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl CompletionError {
    /// Short machine-friendly label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Api { .. } => "api",
            Self::Http { .. } => "http",
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } => *status,
            Self::Api { status, .. } | Self::Http { status } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
