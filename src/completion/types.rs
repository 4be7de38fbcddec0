//! Wire types for the OpenRouter-style `/chat/completions` endpoint

use crate::transcript::{Message, Role};
use serde::{Deserialize, Serialize};

/// A message as sent to the endpoint (timestamps stripped)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Convert durable transcript messages into the request payload
pub fn to_wire<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<ChatMessage> {
    messages.into_iter().map(ChatMessage::from).collect()
}

/// Request body
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub provider: ProviderPreferences<'a>,
    pub messages: &'a [ChatMessage],
}

/// Upstream provider routing preference
#[derive(Debug, Serialize)]
pub struct ProviderPreferences<'a> {
    pub order: &'a [String],
}

/// Successful response body (only the fields we read)
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// Error response body: `{"error": {"message": "..."}}`
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}
