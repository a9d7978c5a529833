//! In-process upstream that stands in for both the chat-completions API and
//! the extraction service. Tests queue responses and inspect what arrived.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use relay_proxies::{
    api::routes::create_router,
    config::{Config, CredentialNames, Secrets, UpstreamConfig},
    AppState,
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;

#[derive(Clone, Debug)]
pub struct Received {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Received {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Default)]
struct MockState {
    queue: VecDeque<(StatusCode, String)>,
    received: Vec<Received>,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockUpstream {
    pub addr: SocketAddr,
    state: Shared,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream { addr, state }
    }

    pub fn respond(&self, status: u16, body: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .queue
            .push_back((StatusCode::from_u16(status).unwrap(), body.into()));
    }

    pub fn received(&self) -> Vec<Received> {
        self.state.lock().unwrap().received.clone()
    }

    pub fn chat_url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    pub fn reader_base(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

async fn record(State(state): State<Shared>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let received = Received {
        method,
        path: uri.path().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, body) = {
        let mut state = state.lock().unwrap();
        state.received.push(received);
        state
            .queue
            .pop_front()
            .unwrap_or((StatusCode::OK, r#"{"choices":[]}"#.to_string()))
    };

    (status, body).into_response()
}

pub fn completion(content: &str) -> String {
    serde_json::json!({
        "id": "cmpl-test",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
    .to_string()
}

pub fn app(upstream: &MockUpstream, secrets: &[(&str, &str)]) -> Router {
    let config = Config {
        server_addr: "127.0.0.1:0".parse().unwrap(),
        secrets: secrets.iter().copied().collect::<Secrets>(),
        credentials: CredentialNames::default(),
        upstream: UpstreamConfig {
            chat_url: upstream.chat_url(),
            reader_base: upstream.reader_base(),
        },
    };
    create_router(AppState::new(config))
}

/// Router whose upstreams point at a loopback port nothing listens on
/// (port 9, discard).
pub fn unreachable_app(secrets: &[(&str, &str)]) -> Router {
    let config = Config {
        server_addr: "127.0.0.1:0".parse().unwrap(),
        secrets: secrets.iter().copied().collect::<Secrets>(),
        credentials: CredentialNames::default(),
        upstream: UpstreamConfig {
            chat_url: "http://127.0.0.1:9/v1/chat/completions".into(),
            reader_base: "http://127.0.0.1:9/".into(),
        },
    };
    create_router(AppState::new(config))
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn has_cors(&self) -> bool {
        self.headers.get("access-control-allow-origin").map(|v| v == "*").unwrap_or(false)
            && self.headers.contains_key("access-control-allow-methods")
            && self.headers.contains_key("access-control-allow-headers")
    }
}

pub async fn call(app: Router, method: Method, uri: &str, body: &str) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

    Reply { status, headers, body }
}
