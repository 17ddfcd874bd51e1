//! Chat-completions client that explains positions.

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};

use super::http_client;

const SYSTEM_PROMPT: &str = "You are a friendly chess coach helping a club player review a game. \
Explain the position in plain language: plans, threats, and why moves are good or bad. \
When an engine evaluation is provided, keep concrete claims consistent with it and do not invent long variations. \
Keep answers short unless asked for detail.";

/// Prior turns sent along with a question.
const HISTORY_TURNS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("no OpenAI API key is configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Request(String),

    #[error("chat service returned HTTP {0}")]
    Status(u16),

    #[error("chat service returned an empty reply")]
    EmptyReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// Everything the assistant gets to see about the displayed position.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub fen: String,
    /// SAN moves leading to the position, most recent last
    pub recent_moves: Vec<String>,
    /// Human-readable engine summary, when analysis is available
    pub evaluation: Option<String>,
    pub question: String,
    /// Earlier conversation, oldest first
    pub history: Vec<PromptMessage>,
}

/// Assemble the prompt for a question about the current position.
pub fn build_messages(ctx: &ChatContext) -> Vec<PromptMessage> {
    let mut messages = vec![PromptMessage {
        role: Role::System,
        content: SYSTEM_PROMPT.to_string(),
    }];

    let skip = ctx.history.len().saturating_sub(HISTORY_TURNS);
    messages.extend(ctx.history.iter().skip(skip).cloned());

    let mut content = format!("Position (FEN): {}\n", ctx.fen);
    if ctx.recent_moves.is_empty() {
        content.push_str("Moves so far: none (starting position)\n");
    } else {
        content.push_str(&format!("Moves so far: {}\n", ctx.recent_moves.join(" ")));
    }
    if let Some(eval) = &ctx.evaluation {
        content.push_str(&format!("Engine evaluation: {eval}\n"));
    }
    content.push_str(&format!("\nQuestion: {}", ctx.question.trim()));

    messages.push(PromptMessage {
        role: Role::User,
        content,
    });
    messages
}

pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn explain(&self, ctx: &ChatContext) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::NotConfigured)?;
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": build_messages(ctx),
            "temperature": 0.4,
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ChatError::Status(resp.status().as_u16()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or(ChatError::EmptyReply)
    }
}
