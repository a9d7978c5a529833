//! Generic request forwarding shared by every proxy endpoint.
//!
//! An [`Endpoint`] describes how one route reads its input, which credential it
//! needs, what it sends upstream and how the upstream answer (or any failure)
//! is shaped for the caller. [`forward`] runs that description for a single
//! inbound request and performs at most one outbound call.

pub mod chat;
pub mod cors;
pub mod reader;
pub mod summarize;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use reqwest::Client;
use serde_json::Value;
use std::time::Instant;

use crate::AppState;
use crate::config::Secrets;
use crate::error::{AppError, Result};

pub use chat::ChatProxy;
pub use reader::ReaderProxy;
pub use summarize::SummarizeProxy;

/// The single outbound call an endpoint wants made.
#[derive(Debug)]
pub enum Outbound {
    /// POST a JSON payload with bearer authorization.
    Json {
        url: String,
        bearer: String,
        payload: Value,
    },
    /// Plain GET without authorization.
    Get { url: String },
}

impl Outbound {
    pub fn url(&self) -> &str {
        match self {
            Outbound::Json { url, .. } | Outbound::Get { url } => url,
        }
    }
}

/// Status and raw body received from the upstream.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

pub trait Endpoint: Send + Sync {
    type Input;

    fn name(&self) -> &'static str;

    /// Whether OPTIONS is answered with a 204 preflight response.
    fn answers_preflight(&self) -> bool {
        false
    }

    /// Ordered credential names, or `None` when no credential is needed.
    fn credential_names(&self) -> Option<&[String]> {
        None
    }

    fn parse(&self, body: &[u8]) -> Result<Self::Input>;

    fn outbound(&self, input: Self::Input, credential: Option<&str>) -> Result<Outbound>;

    fn reply(&self, upstream: UpstreamReply) -> Result<Response>;

    fn reject(&self, err: AppError) -> Response;

    /// Final touch applied to every response, including rejections.
    fn decorate(&self, response: Response) -> Response {
        response
    }
}

/// Runs one inbound request through `endpoint`.
pub async fn forward<E: Endpoint>(
    state: &AppState,
    endpoint: &E,
    method: &Method,
    body: &[u8],
) -> Response {
    let start_time = Instant::now();

    let response = if *method == Method::OPTIONS && endpoint.answers_preflight() {
        crate::api::response::empty(StatusCode::NO_CONTENT)
    } else if *method != Method::POST {
        endpoint.reject(AppError::MethodNotAllowed)
    } else {
        match run(&state.client, &state.config.secrets, endpoint, body).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(endpoint = endpoint.name(), error = %err, "Request failed");
                endpoint.reject(err)
            }
        }
    };

    let response = endpoint.decorate(response);
    tracing::info!(
        endpoint = endpoint.name(),
        %method,
        status = response.status().as_u16(),
        elapsed = ?start_time.elapsed(),
        "Handled request"
    );
    response
}

async fn run<E: Endpoint>(
    client: &Client,
    secrets: &Secrets,
    endpoint: &E,
    body: &[u8],
) -> Result<Response> {
    let input = endpoint.parse(body)?;

    let credential = match endpoint.credential_names() {
        Some(names) => Some(secrets.resolve(names).ok_or(AppError::MissingCredential)?),
        None => None,
    };

    let outbound = endpoint.outbound(input, credential)?;
    let upstream = send(client, outbound).await?;
    endpoint.reply(upstream)
}

async fn send(client: &Client, outbound: Outbound) -> Result<UpstreamReply> {
    tracing::debug!(target_url = outbound.url(), "Calling upstream");

    let request = match outbound {
        Outbound::Json { url, bearer, payload } => client.post(url).bearer_auth(bearer).json(&payload),
        Outbound::Get { url } => client.get(url),
    };

    let res = request.send().await?;
    // reqwest and axum do not share an `http` version, so go through the code.
    let status = StatusCode::from_u16(res.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let body = res.bytes().await?;

    Ok(UpstreamReply { status, body })
}
