use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_CHAT_MODEL: &str = "mistral-medium-latest";
pub const SUMMARY_MODEL: &str = "mistral-large-latest";

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// A completion request carrying a single user message.
    pub fn single_user(model: impl Into<String>, content: impl Into<String>) -> Self {
        ChatRequest {
            model: model.into(),
            messages: vec![Message {
                role: "user".into(),
                content: content.into(),
            }],
        }
    }
}

/// Parses an upstream body, treating anything that is not JSON as `{}`.
pub fn parse_lenient(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()))
}

/// Content of the first choice, or an empty string when absent.
pub fn first_choice_content(json: &Value) -> String {
    json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Error text reported by the upstream, if it sent one.
pub fn error_message(json: &Value) -> Option<String> {
    json["error"]["message"]
        .as_str()
        .or_else(|| json["message"].as_str())
        .or_else(|| json["error"].as_str())
        .map(str::to_string)
}
