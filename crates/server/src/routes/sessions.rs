use axum::{extract::Path, http::StatusCode, Extension, Json};
use chess_core::pgn::{export_pgn as write_pgn, parse_pgn};
use chess_core::{rules, Intent};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::parse_body;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum NavigateRequest {
    First,
    Previous,
    Next,
    Last,
    Jump { index: isize },
}

impl From<NavigateRequest> for Intent {
    fn from(req: NavigateRequest) -> Self {
        match req {
            NavigateRequest::First => Intent::First,
            NavigateRequest::Previous => Intent::Previous,
            NavigateRequest::Next => Intent::Next,
            NavigateRequest::Last => Intent::Last,
            NavigateRequest::Jump { index } => Intent::Jump(index),
        }
    }
}

/// Either squares or a UCI string.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub promotion: Option<String>,
    pub uci: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PgnRequest {
    pub pgn: String,
}

/// POST /api/sessions
pub async fn create_session(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<JsonValue>) {
    let (_, view) = state.sessions.create().await;
    (StatusCode::CREATED, Json(view))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JsonValue>, AppError> {
    let view = state.sessions.read(id, |s| s.view(id)).await?;
    Ok(Json(view))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::session_not_found());
    }
    tracing::info!(%id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/{id}/new-game
pub async fn new_game(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JsonValue>, AppError> {
    let view = state
        .sessions
        .write(id, |s| {
            s.new_game();
            s.view(id)
        })
        .await?;
    Ok(Json(view))
}

/// POST /api/sessions/{id}/pgn
pub async fn load_pgn(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>, AppError> {
    let req: PgnRequest = parse_body(body)?;
    // Parse before taking the lock; a bad PGN leaves the session untouched.
    let game = parse_pgn(&req.pgn)?;
    let plies = game.line.len();

    let view = state
        .sessions
        .write(id, |s| {
            s.load_game(game);
            s.view(id)
        })
        .await?;
    tracing::info!(%id, plies, "PGN loaded");
    Ok(Json(view))
}

/// GET /api/sessions/{id}/pgn
pub async fn export_pgn(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JsonValue>, AppError> {
    let pgn = state
        .sessions
        .read(id, |s| write_pgn(&s.metadata, s.navigator.line()))
        .await?;
    Ok(Json(serde_json::json!({ "pgn": pgn })))
}

/// POST /api/sessions/{id}/navigate
pub async fn navigate(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>, AppError> {
    let req: NavigateRequest = parse_body(body)?;
    let intent = Intent::from(req);

    let (moved, mut view) = state
        .sessions
        .write(id, |s| {
            let moved = s.navigate(intent);
            (moved, s.view(id))
        })
        .await?;
    view["moved"] = JsonValue::Bool(moved);
    Ok(Json(view))
}

/// POST /api/sessions/{id}/moves
pub async fn play_move(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>, AppError> {
    let req: MoveRequest = parse_body(body)?;

    let (from, to, promotion) = match (&req.uci, &req.from, &req.to) {
        (Some(uci), _, _) => rules::parse_uci(uci)?,
        (None, Some(from), Some(to)) => {
            let promotion = match req.promotion.as_deref().filter(|p| !p.is_empty()) {
                Some(p) => Some(rules::parse_promotion(p)?),
                None => None,
            };
            (rules::parse_square(from)?, rules::parse_square(to)?, promotion)
        }
        _ => {
            return Err(AppError::BadRequest(
                "Provide either 'uci' or both 'from' and 'to'".to_string(),
            ))
        }
    };

    let view = state
        .sessions
        .write(id, |s| {
            let played = s.play_move(from, to, promotion)?;
            let mut view = s.view(id);
            view["played"] = played.to_json();
            Ok::<_, AppError>(view)
        })
        .await??;
    Ok(Json(view))
}
