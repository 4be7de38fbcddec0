//! Completion client for OpenAI-compatible chat endpoints (OpenRouter by default)
//!
//! The endpoint is stateless: every call re-sends the full transcript, and
//! no context-window trimming is done locally. One request per call, no
//! retries. Failures come back as a single `CompletionError`.

mod error;
mod types;

pub use error::CompletionError;
pub use types::{to_wire, ChatMessage};

use crate::config::Config;
use async_trait::async_trait;
use std::time::Instant;
use types::{CompletionRequest, CompletionResponse, ErrorEnvelope, ProviderPreferences};

/// Endpoint, routing and identification settings for completion calls
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Full URL of the chat completions endpoint
    pub api_url: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Provider preference order (OpenRouter `provider.order`)
    pub provider_order: Vec<String>,
    /// Client title sent as `X-Title`
    pub title: String,
    /// Optional `HTTP-Referer` header
    pub referer: Option<String>,
}

impl From<&Config> for CompletionConfig {
    fn from(config: &Config) -> Self {
        Self {
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            provider_order: config.provider_order.clone(),
            title: config.app_title.clone(),
            referer: config.referer.clone(),
        }
    }
}

/// Anything that can turn a message history into an assistant reply
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send the full history and return the first choice's content
    async fn complete(
        &self,
        messages: &[ChatMessage],
        api_key: &str,
    ) -> Result<String, CompletionError>;
}

/// HTTP implementation of `CompletionBackend`
pub struct CompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("philo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(
            url = %config.api_url,
            model = %config.model,
            providers = ?config.provider_order,
            "Completion client initialized"
        );

        Ok(Self { http, config })
    }

    fn build_request(&self, messages: &[ChatMessage], api_key: &str) -> reqwest::RequestBuilder {
        let body = CompletionRequest {
            model: &self.config.model,
            provider: ProviderPreferences {
                order: &self.config.provider_order,
            },
            messages,
        };

        let mut request = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .header("X-Title", &self.config.title)
            .json(&body);

        if let Some(referer) = &self.config.referer {
            request = request.header("HTTP-Referer", referer);
        }

        request
    }

    async fn send(&self, messages: &[ChatMessage], api_key: &str) -> Result<String, CompletionError> {
        let response = self.build_request(messages, api_key).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        api_key: &str,
    ) -> Result<String, CompletionError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CompletionError::Auth {
                status: None,
                message: "No API key configured".to_string(),
            });
        }

        let start = Instant::now();
        let result = self.send(messages, api_key).await;
        let duration = start.elapsed();

        match &result {
            Ok(content) => tracing::info!(
                model = %self.config.model,
                messages = messages.len(),
                reply_chars = content.chars().count(),
                duration_ms = %duration.as_millis(),
                "Completion succeeded"
            ),
            Err(e) => tracing::warn!(
                model = %self.config.model,
                messages = messages.len(),
                kind = e.kind(),
                status = ?e.status(),
                duration_ms = %duration.as_millis(),
                error = %e,
                "Completion failed"
            ),
        }

        result
    }
}

/// Map a raw HTTP status and body to the reply text or a typed error
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<String, CompletionError> {
    if !(200..300).contains(&status) {
        return Err(classify_failure(status, body));
    }

    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Decode(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            CompletionError::Decode("response has no choices[0].message.content".to_string())
        })
}

fn classify_failure(status: u16, body: &str) -> CompletionError {
    let remote_message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.trim().is_empty());

    match (status, remote_message) {
        (401 | 403, message) => CompletionError::Auth {
            status: Some(status),
            message: message.unwrap_or_else(|| format!("HTTP error! status: {}", status)),
        },
        (_, Some(message)) => CompletionError::Api { status, message },
        (_, None) => CompletionError::Http { status },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, MockReply};
    use crate::transcript::Role;

    fn user(content: &str) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_interpret_success() {
        let body = r#"{"choices":[{"message":{"content":"Hello!"}}]}"#;
        assert_eq!(interpret_response(200, body).unwrap(), "Hello!");
    }

    #[test]
    fn test_interpret_auth_with_remote_message() {
        let body = r#"{"error":{"message":"invalid key"}}"#;
        let err = interpret_response(401, body).unwrap_err();
        assert!(matches!(err, CompletionError::Auth { status: Some(401), .. }));
        assert_eq!(err.to_string(), "invalid key");
    }

    #[test]
    fn test_interpret_auth_without_body_falls_back_to_status() {
        let err = interpret_response(403, "").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 403");
        assert_eq!(err.kind(), "auth");
    }

    #[test]
    fn test_interpret_structured_api_error() {
        let body = r#"{"error":{"message":"model not found","code":404}}"#;
        let err = interpret_response(404, body).unwrap_err();
        assert!(matches!(err, CompletionError::Api { status: 404, .. }));
        assert_eq!(err.to_string(), "model not found");
    }

    #[test]
    fn test_interpret_unstructured_http_error() {
        let err = interpret_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, CompletionError::Http { status: 502 }));
        assert_eq!(err.to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn test_interpret_empty_error_message_is_unstructured() {
        let err = interpret_response(500, r#"{"error":{"message":"  "}}"#).unwrap_err();
        assert!(matches!(err, CompletionError::Http { status: 500 }));
    }

    #[test]
    fn test_interpret_success_without_choices_is_decode_error() {
        let err = interpret_response(200, r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(err.kind(), "decode");

        let err = interpret_response(200, "not json").unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_to_wire_strips_timestamps() {
        let mut transcript = crate::transcript::Transcript::new();
        transcript.append(Role::User, "Hi");
        transcript.append(Role::Assistant, "Hello!");

        let wire = to_wire(transcript.messages());
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"}
            ])
        );
    }

    #[tokio::test]
    async fn test_complete_against_mock_endpoint() {
        let url = test_support::spawn_endpoint(MockReply::ok_content("Hello!")).await;
        let client = CompletionClient::new(test_support::completion_config(&url)).unwrap();

        let reply = client.complete(&[user("Hi")], "sk-test").await.unwrap();
        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_complete_sends_full_history_and_headers() {
        let (url, captured) =
            test_support::spawn_capturing_endpoint(MockReply::ok_content("ok")).await;
        let mut config = test_support::completion_config(&url);
        config.referer = Some("https://example.test/philo".to_string());
        let client = CompletionClient::new(config).unwrap();

        let history = vec![
            user("first"),
            ChatMessage {
                role: Role::Assistant,
                content: "reply".to_string(),
            },
            user("second"),
        ];
        client.complete(&history, "sk-secret").await.unwrap();

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];

        assert_eq!(request.header("authorization"), Some("Bearer sk-secret"));
        assert_eq!(request.header("x-title"), Some("philo tests"));
        assert_eq!(
            request.header("http-referer"),
            Some("https://example.test/philo")
        );
        assert_eq!(request.body["model"], "test/model");
        assert_eq!(request.body["provider"]["order"], serde_json::json!(["fireworks"]));
        assert_eq!(request.body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(request.body["messages"][2]["content"], "second");
        assert!(request.body["messages"][0].get("timestamp").is_none());
    }

    #[tokio::test]
    async fn test_complete_surfaces_auth_error() {
        let url = test_support::spawn_endpoint(MockReply::new(
            401,
            r#"{"error":{"message":"invalid key"}}"#,
        ))
        .await;
        let client = CompletionClient::new(test_support::completion_config(&url)).unwrap();

        let err = client.complete(&[user("Hi")], "bad").await.unwrap_err();
        assert!(matches!(err, CompletionError::Auth { .. }));
        assert_eq!(err.to_string(), "invalid key");
    }

    #[tokio::test]
    async fn test_complete_rejects_blank_key_without_sending() {
        let (url, captured) =
            test_support::spawn_capturing_endpoint(MockReply::ok_content("never")).await;
        let client = CompletionClient::new(test_support::completion_config(&url)).unwrap();

        let err = client.complete(&[user("Hi")], "   ").await.unwrap_err();
        assert!(matches!(err, CompletionError::Auth { status: None, .. }));
        assert!(captured.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_reports_network_error() {
        let url = test_support::unreachable_url().await;
        let client = CompletionClient::new(test_support::completion_config(&url)).unwrap();

        let err = client.complete(&[user("Hi")], "sk-test").await.unwrap_err();
        assert!(matches!(err, CompletionError::Network(_)));
    }
}
