use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{json, Value};

use super::{cors, Endpoint, Outbound, UpstreamReply};
use crate::api::models::{SummarizeInput, Summary};
use crate::api::response;
use crate::error::{AppError, ErrorResponse, Result};
use crate::llm::{self, ChatRequest, SUMMARY_MODEL};

/// Longest transcript excerpt, in characters, sent upstream.
pub const MAX_CONTENT_CHARS: usize = 12_000;

/// Turns a meeting transcript into a short bullet summary.
#[derive(Clone, Debug)]
pub struct SummarizeProxy {
    pub url: String,
    pub credential_names: Vec<String>,
}

pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(title: &str, content: &str) -> String {
    let excerpt = truncate_chars(content, MAX_CONTENT_CHARS);
    format!(
        "You are a meeting assistant. Summarize the meeting below in exactly 5 concise bullet points. \
         After the bullets, list the key decisions and the action items (with owners when they are mentioned).\n\n\
         Title: {title}\n\n\
         Transcript:\n{excerpt}"
    )
}

impl Endpoint for SummarizeProxy {
    type Input = SummarizeInput;

    fn name(&self) -> &'static str {
        "summarize"
    }

    fn answers_preflight(&self) -> bool {
        true
    }

    fn credential_names(&self) -> Option<&[String]> {
        Some(&self.credential_names)
    }

    fn parse(&self, body: &[u8]) -> Result<SummarizeInput> {
        Ok(serde_json::from_slice(body)?)
    }

    fn outbound(&self, input: SummarizeInput, credential: Option<&str>) -> Result<Outbound> {
        let prompt = build_prompt(
            input.title.as_deref().unwrap_or_default(),
            input.content.as_deref().unwrap_or_default(),
        );

        Ok(Outbound::Json {
            url: self.url.clone(),
            bearer: credential.unwrap_or_default().to_string(),
            payload: serde_json::to_value(ChatRequest::single_user(SUMMARY_MODEL, prompt))?,
        })
    }

    fn reply(&self, upstream: UpstreamReply) -> Result<Response> {
        if !upstream.status.is_success() {
            // Only the status reaches the caller; the message is for the log.
            return Err(AppError::Upstream {
                status: upstream.status,
                message: llm::error_message(&llm::parse_lenient(&upstream.body)).unwrap_or_default(),
            });
        }

        // Unlike chat, an unreadable success body is a failure here.
        let json: Value = serde_json::from_slice(&upstream.body)?;
        Ok(response::json(
            StatusCode::OK,
            Summary {
                summary: llm::first_choice_content(&json),
            },
        ))
    }

    fn reject(&self, err: AppError) -> Response {
        match err {
            AppError::MethodNotAllowed => response::empty(StatusCode::METHOD_NOT_ALLOWED),
            AppError::MissingCredential => response::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("missing_mistral_key"),
            ),
            // Always 500; the upstream code travels in the body.
            AppError::Upstream { status, .. } => response::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "mistral_failed", "status": status.as_u16() }),
            ),
            other => response::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed", "message": other.to_string() }),
            ),
        }
    }

    fn decorate(&self, response: Response) -> Response {
        cors::allow_any(response)
    }
}
