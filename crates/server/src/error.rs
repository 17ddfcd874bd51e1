use analysis_engine::EngineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chess_core::{NavError, PgnError, RulesError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// An import provider or other upstream service failed.
    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Pgn(#[from] PgnError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AppError {
    pub fn session_not_found() -> Self {
        AppError::NotFound("Session not found".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Nav(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Rules(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Pgn(e) => (StatusCode::BAD_REQUEST, format!("Invalid PGN: {e}")),
            AppError::Engine(e) => {
                let status = match e {
                    EngineError::NotConfigured | EngineError::Spawn(_) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    EngineError::InvalidFen(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::BAD_GATEWAY,
                };
                tracing::error!("Engine error: {e}");
                (status, e.to_string())
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
