use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use super::parse_body;
use crate::error::AppError;
use crate::sessions::ChatMessage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

/// GET /api/sessions/{id}/chat
pub async fn get_conversation(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JsonValue>, AppError> {
    let messages = state.sessions.read(id, |s| s.chat.clone()).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// POST /api/sessions/{id}/chat
///
/// Ask about the displayed position. A failed reply is appended as a single
/// assistant error message and the conversation is still returned.
pub async fn ask(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>, AppError> {
    let req: ChatRequest = parse_body(body)?;
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err(AppError::BadRequest("Question must not be empty".to_string()));
    }

    let context = state
        .sessions
        .write(id, |s| {
            let context = s.chat_context(&question);
            s.chat.push(ChatMessage::user(&question));
            context
        })
        .await?;

    let reply = match state.chat.explain(&context).await {
        Ok(text) => ChatMessage::assistant(text),
        Err(e) => {
            tracing::warn!(%id, "Chat request failed: {e}");
            ChatMessage::failure(&e.to_string())
        }
    };

    let messages = state
        .sessions
        .write(id, |s| {
            s.chat.push(reply);
            s.chat.clone()
        })
        .await?;
    Ok(Json(json!({ "messages": messages })))
}
