use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummarizeInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub summary: String,
}
