pub mod clients;
pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

/// Build the HTTP router around shared state.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Sessions
        .route("/api/sessions", post(routes::sessions::create_session))
        .route(
            "/api/sessions/{id}",
            get(routes::sessions::get_session).delete(routes::sessions::delete_session),
        )
        .route("/api/sessions/{id}/new-game", post(routes::sessions::new_game))
        .route(
            "/api/sessions/{id}/pgn",
            get(routes::sessions::export_pgn).post(routes::sessions::load_pgn),
        )
        .route("/api/sessions/{id}/navigate", post(routes::sessions::navigate))
        .route("/api/sessions/{id}/moves", post(routes::sessions::play_move))
        .route("/api/sessions/{id}/import", post(routes::import::import_into_session))
        // Analysis
        .route(
            "/api/sessions/{id}/analysis",
            get(routes::analysis::get_analysis).post(routes::analysis::analyse_position),
        )
        // Chat
        .route(
            "/api/sessions/{id}/chat",
            get(routes::chat::get_conversation).post(routes::chat::ask),
        )
        // Import providers: specific routes before parameterized
        .route("/api/import/lichess/game/{game_id}", get(routes::import::lichess_game))
        .route("/api/import/lichess/{username}", get(routes::import::lichess_games))
        .route("/api/import/chess-com/{username}", get(routes::import::chess_com_games))
        .layer(Extension(state))
        .layer(cors)
}
