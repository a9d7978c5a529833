use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use super::{cors, Endpoint, Outbound, UpstreamReply};
use crate::api::response;
use crate::error::{AppError, Result};

/// Fetches a page as plain text through the extraction service.
#[derive(Clone, Debug)]
pub struct ReaderProxy {
    pub base: String,
}

impl ReaderProxy {
    /// Extraction URL for `url`. The inner scheme is always plain `http://`.
    pub fn target(&self, url: &str) -> String {
        let bare = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        format!("{}http://{}", self.base, bare)
    }
}

impl Endpoint for ReaderProxy {
    type Input = String;

    fn name(&self) -> &'static str {
        "reader"
    }

    fn parse(&self, body: &[u8]) -> Result<String> {
        let json: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        json.get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Missing url".to_string()))
    }

    fn outbound(&self, url: String, _credential: Option<&str>) -> Result<Outbound> {
        Ok(Outbound::Get { url: self.target(&url) })
    }

    fn reply(&self, upstream: UpstreamReply) -> Result<Response> {
        Ok(response::text(
            StatusCode::OK,
            String::from_utf8_lossy(&upstream.body).into_owned(),
        ))
    }

    fn reject(&self, err: AppError) -> Response {
        match err {
            AppError::MethodNotAllowed => response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
            AppError::BadRequest(_) => response::text(StatusCode::BAD_REQUEST, "Missing url"),
            _ => response::text(StatusCode::INTERNAL_SERVER_ERROR, "Error"),
        }
    }

    fn decorate(&self, response: Response) -> Response {
        cors::allow_any(response)
    }
}
