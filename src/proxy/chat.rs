use axum::http::StatusCode;
use axum::response::Response;

use super::{Endpoint, Outbound, UpstreamReply};
use crate::api::models::{ChatInput, ChatReply};
use crate::api::response;
use crate::error::{AppError, ErrorResponse, Result};
use crate::llm::{self, ChatRequest, DEFAULT_CHAT_MODEL};

pub const MISSING_CREDENTIAL: &str = "credential missing";
const UPSTREAM_FALLBACK: &str = "Upstream error";

/// Forwards a single prompt to the chat-completions API.
#[derive(Clone, Debug)]
pub struct ChatProxy {
    pub url: String,
    pub credential_names: Vec<String>,
}

impl Endpoint for ChatProxy {
    type Input = ChatInput;

    fn name(&self) -> &'static str {
        "chat"
    }

    fn credential_names(&self) -> Option<&[String]> {
        Some(&self.credential_names)
    }

    fn parse(&self, body: &[u8]) -> Result<ChatInput> {
        Ok(serde_json::from_slice(body)?)
    }

    fn outbound(&self, input: ChatInput, credential: Option<&str>) -> Result<Outbound> {
        let model = input
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let prompt = input.prompt.unwrap_or_default();

        Ok(Outbound::Json {
            url: self.url.clone(),
            bearer: credential.unwrap_or_default().to_string(),
            payload: serde_json::to_value(ChatRequest::single_user(model, prompt))?,
        })
    }

    fn reply(&self, upstream: UpstreamReply) -> Result<Response> {
        let json = llm::parse_lenient(&upstream.body);

        if !upstream.status.is_success() {
            return Err(AppError::Upstream {
                status: upstream.status,
                message: llm::error_message(&json).unwrap_or_else(|| UPSTREAM_FALLBACK.to_string()),
            });
        }

        Ok(response::json(
            StatusCode::OK,
            ChatReply {
                reply: llm::first_choice_content(&json),
            },
        ))
    }

    fn reject(&self, err: AppError) -> Response {
        match err {
            AppError::MethodNotAllowed => response::empty(StatusCode::METHOD_NOT_ALLOWED),
            AppError::MissingCredential => response::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(MISSING_CREDENTIAL),
            ),
            AppError::Upstream { status, message } => {
                response::json(status, ErrorResponse::new(message))
            }
            // Includes transport failures.
            _ => response::json(StatusCode::BAD_REQUEST, ErrorResponse::new("Bad request")),
        }
    }
}
