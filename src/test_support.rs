//! Test helpers: a mock completion endpoint served by axum on an ephemeral port

use crate::completion::CompletionConfig;
use axum::{
    extract::Json,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::{Arc, Mutex};

const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

/// Canned response returned for every request
#[derive(Debug, Clone)]
pub struct MockReply {
    status: u16,
    body: String,
}

impl MockReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 with `choices[0].message.content` set
    pub fn ok_content(content: &str) -> Self {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        });
        Self::new(200, body.to_string())
    }
}

impl IntoResponse for MockReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// A request as seen by the mock endpoint
#[derive(Debug)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock endpoint");
    let addr = listener.local_addr().expect("mock endpoint address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock endpoint");
    });
    format!("http://{}{}", addr, COMPLETIONS_PATH)
}

/// Serve `reply` for every POST; returns the endpoint URL
pub async fn spawn_endpoint(reply: MockReply) -> String {
    let router = Router::new().route(
        COMPLETIONS_PATH,
        post(move || {
            let reply = reply.clone();
            async move { reply }
        }),
    );
    serve(router).await
}

/// Like `spawn_endpoint`, but records each request's headers and JSON body
pub async fn spawn_capturing_endpoint(reply: MockReply) -> (String, Captured) {
    let captured: Captured = Arc::default();
    let sink = captured.clone();
    let router = Router::new().route(
        COMPLETIONS_PATH,
        post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
            let sink = sink.clone();
            let reply = reply.clone();
            async move {
                sink.lock().unwrap().push(CapturedRequest { headers, body });
                reply
            }
        }),
    );
    (serve(router).await, captured)
}

/// URL of a port that was just released, so connections are refused
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("free port address");
    drop(listener);
    format!("http://{}{}", addr, COMPLETIONS_PATH)
}

pub fn completion_config(url: &str) -> CompletionConfig {
    CompletionConfig {
        api_url: url.to_string(),
        model: "test/model".to_string(),
        provider_order: vec!["fireworks".to_string()],
        title: "philo tests".to_string(),
        referer: None,
    }
}
