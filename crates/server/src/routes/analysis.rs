use analysis_engine::{AnalysisLimits, EngineError, SearchLimit};
use axum::{body::Bytes, extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::error::AppError;
use crate::sessions::analysis_json;
use crate::state::AppState;

/// Optional overrides of the configured search limits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub movetime_ms: Option<u64>,
    pub multipv: Option<u32>,
}

impl AnalysisRequest {
    fn limits(&self, defaults: AnalysisLimits) -> Result<AnalysisLimits, AppError> {
        let limit = match (self.depth, self.nodes, self.movetime_ms) {
            (None, None, None) => defaults.limit,
            (Some(d), None, None) => SearchLimit::Depth(d.clamp(1, 40)),
            (None, Some(n), None) => SearchLimit::Nodes(n.max(1)),
            (None, None, Some(ms)) => SearchLimit::MoveTimeMs(ms.clamp(10, 60_000)),
            _ => {
                return Err(AppError::BadRequest(
                    "Specify at most one of depth, nodes, movetimeMs".to_string(),
                ))
            }
        };
        Ok(AnalysisLimits {
            limit,
            multipv: self.multipv.unwrap_or(defaults.multipv).clamp(1, 5),
        })
    }
}

/// POST /api/sessions/{id}/analysis
///
/// Analyse the displayed position. The session lock is released while the
/// engine searches; a result for a position the user has since left is
/// returned with `stale: true` but not stored.
pub async fn analyse_position(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<JsonValue>, AppError> {
    let req: AnalysisRequest = if body.iter().all(u8::is_ascii_whitespace) {
        AnalysisRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request: {e}")))?
    };

    let engine = state
        .engine
        .clone()
        .ok_or(AppError::Engine(EngineError::NotConfigured))?;
    let limits = req.limits(engine.config().default_limits)?;

    let ticket = state.sessions.write(id, |s| s.issue_analysis()).await?;
    let lines = engine.analyse(&ticket.fen, Some(limits)).await?;

    let fen = ticket.fen.clone();
    let generation = ticket.generation;
    let payload = analysis_json(&fen, &lines);
    let kept = state
        .sessions
        .write(id, |s| s.publish_analysis(ticket, lines))
        .await?;

    Ok(Json(json!({
        "fen": fen,
        "generation": generation,
        "stale": !kept,
        "lines": payload,
    })))
}

/// GET /api/sessions/{id}/analysis
pub async fn get_analysis(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JsonValue>, AppError> {
    let body = state
        .sessions
        .read(id, |s| {
            let fen = s.navigator.displayed_fen();
            match s.current_analysis() {
                Some(a) => json!({
                    "fen": fen,
                    "generation": a.ticket.generation,
                    "available": true,
                    "lines": analysis_json(&a.ticket.fen, &a.lines),
                }),
                None => json!({
                    "fen": fen,
                    "available": false,
                    "lines": [],
                }),
            }
        })
        .await?;
    Ok(Json(body))
}
