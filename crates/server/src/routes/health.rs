use axum::{Extension, Json};
use serde_json::Value as JsonValue;

use crate::state::AppState;

/// GET /health
pub async fn health_check(Extension(state): Extension<AppState>) -> Json<JsonValue> {
    Json(serde_json::json!({
        "status": "ok",
        "engine": state.engine.is_some(),
        "chat": state.chat.is_configured(),
        "sessions": state.sessions.len().await,
    }))
}
