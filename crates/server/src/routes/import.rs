use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use chess_core::pgn::parse_pgn;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use super::parse_body;
use crate::clients::GameSummary;
use crate::error::AppError;
use crate::state::AppState;

const MAX_LISTED_GAMES: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ChessComQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LichessQuery {
    pub max: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSource {
    ChessCom,
    Lichess,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub source: ImportSource,
    pub username: Option<String>,
    pub game_id: Option<String>,
}

/// GET /api/import/chess-com/{username}
pub async fn chess_com_games(
    Extension(state): Extension<AppState>,
    Path(username): Path<String>,
    Query(q): Query<ChessComQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let limit = q.limit.unwrap_or(10).clamp(1, MAX_LISTED_GAMES);
    let games = state
        .chess_com
        .fetch_recent_games(&username, limit)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "username": username, "games": games })))
}

/// GET /api/import/lichess/{username}
pub async fn lichess_games(
    Extension(state): Extension<AppState>,
    Path(username): Path<String>,
    Query(q): Query<LichessQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let max = q.max.unwrap_or(10).clamp(1, MAX_LISTED_GAMES);
    let games = state
        .lichess
        .fetch_user_games(&username, max)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "username": username, "games": games })))
}

/// GET /api/import/lichess/game/{game_id}
pub async fn lichess_game(
    Extension(state): Extension<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let game = state
        .lichess
        .fetch_game(&game_id)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "game": game })))
}

/// POST /api/sessions/{id}/import
///
/// Fetch a game from a provider and load it: a Lichess game by id, or the
/// most recent game of a user.
pub async fn import_into_session(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>, AppError> {
    let req: ImportRequest = parse_body(body)?;

    // Fail fast on unknown sessions before calling out.
    state.sessions.read(id, |_| ()).await?;

    let summary = fetch_for_import(&state, &req).await?;
    let mut game = parse_pgn(&summary.pgn)?;
    if game.metadata.link.is_none() {
        game.metadata.link = summary.url.clone();
    }

    let view = state
        .sessions
        .write(id, |s| {
            s.load_game(game);
            s.view(id)
        })
        .await?;
    tracing::info!(%id, source = ?req.source, "Imported game into session");
    Ok(Json(view))
}

async fn fetch_for_import(state: &AppState, req: &ImportRequest) -> Result<GameSummary, AppError> {
    let username = req.username.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let game_id = req.game_id.as_deref().map(str::trim).filter(|g| !g.is_empty());

    let games = match (&req.source, game_id, username) {
        (ImportSource::Lichess, Some(game_id), _) => {
            return state.lichess.fetch_game(game_id).await.map_err(AppError::Upstream);
        }
        (ImportSource::Lichess, None, Some(username)) => state
            .lichess
            .fetch_user_games(username, 1)
            .await
            .map_err(AppError::Upstream)?,
        (ImportSource::ChessCom, _, Some(username)) => state
            .chess_com
            .fetch_recent_games(username, 1)
            .await
            .map_err(AppError::Upstream)?,
        (ImportSource::ChessCom, _, None) => {
            return Err(AppError::BadRequest(
                "Chess.com import needs a username".to_string(),
            ))
        }
        (ImportSource::Lichess, None, None) => {
            return Err(AppError::BadRequest(
                "Lichess import needs a username or game_id".to_string(),
            ))
        }
    };

    games
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("No games found".to_string()))
}
