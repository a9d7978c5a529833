use serde::Serialize;
use axum::Json;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

pub fn json<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body.into()).into_response()
}

pub fn empty(status: StatusCode) -> Response {
    status.into_response()
}
