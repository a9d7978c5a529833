use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    response::Response,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::proxy::forward;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    // Each endpoint owns its method policy, so routes accept any method.
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", any(chat_handler))
        .route("/api/summarize", any(summarize_handler))
        .route("/api/reader", any(reader_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn chat_handler(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    forward(&state, &state.proxies.chat, &method, &body).await
}

async fn summarize_handler(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    forward(&state, &state.proxies.summarize, &method, &body).await
}

async fn reader_handler(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    forward(&state, &state.proxies.reader, &method, &body).await
}
