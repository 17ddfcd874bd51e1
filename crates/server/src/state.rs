use std::sync::Arc;

use analysis_engine::EngineClient;

use crate::clients::chess_com::ChessComClient;
use crate::clients::lichess::LichessClient;
use crate::clients::openai::ChatClient;
use crate::config::Config;
use crate::sessions::SessionStore;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// None when no engine is configured or it failed to start.
    pub engine: Option<EngineClient>,
    pub chat: Arc<ChatClient>,
    pub chess_com: Arc<ChessComClient>,
    pub lichess: Arc<LichessClient>,
}

impl AppState {
    pub fn new(config: Config, engine: Option<EngineClient>) -> Self {
        let timeout = config.http_timeout_secs;
        Self {
            sessions: SessionStore::new(),
            engine,
            chat: Arc::new(ChatClient::new(
                &config.openai_base_url,
                config.openai_api_key.clone(),
                &config.openai_model,
                timeout,
            )),
            chess_com: Arc::new(ChessComClient::new(&config.chess_com_api_url, timeout)),
            lichess: Arc::new(LichessClient::new(&config.lichess_api_url, timeout)),
            config,
        }
    }
}
