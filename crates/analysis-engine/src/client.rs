//! Shared handle to the engine process.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::eval::{AnalysisLimits, EvaluationLine};
use crate::stockfish::StockfishEngine;

/// Explicitly constructed engine handle. Cloning shares the same process;
/// searches are serialised. The process is spawned on first use and
/// respawned after a failure.
#[derive(Clone)]
pub struct EngineClient {
    config: Arc<EngineConfig>,
    engine: Arc<Mutex<Option<StockfishEngine>>>,
}

impl EngineClient {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(Mutex::new(None)),
        }
    }

    /// Build a client and spawn the process up front.
    /// Returns None (and logs) when the engine cannot be started.
    pub async fn start(config: EngineConfig) -> Option<Self> {
        let client = Self::new(config);
        match client.warm_up().await {
            Ok(()) => Some(client),
            Err(e) => {
                warn!("Engine unavailable: {e}");
                None
            }
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn warm_up(&self) -> Result<(), EngineError> {
        let mut slot = self.engine.lock().await;
        if slot.is_none() {
            *slot = Some(self.spawn().await?);
        }
        Ok(())
    }

    async fn spawn(&self) -> Result<StockfishEngine, EngineError> {
        let budget = Duration::from_secs(self.config.search_timeout_secs);
        tokio::time::timeout(budget, StockfishEngine::spawn(&self.config))
            .await
            .map_err(|_| EngineError::Timeout(budget.as_secs()))?
    }

    /// Analyse `fen` with the given limits, or the configured defaults.
    pub async fn analyse(
        &self,
        fen: &str,
        limits: Option<AnalysisLimits>,
    ) -> Result<Vec<EvaluationLine>, EngineError> {
        validate_fen(fen)?;
        let limits = limits.unwrap_or(self.config.default_limits);

        let mut slot = self.engine.lock().await;
        if slot.is_none() {
            info!(path = %self.config.path, "Starting engine");
            *slot = Some(self.spawn().await?);
        }
        let Some(engine) = slot.as_mut() else {
            return Err(EngineError::NotConfigured);
        };

        match engine.analyse(fen, &limits).await {
            Ok(lines) => Ok(lines),
            Err(e) => {
                warn!("Engine failed, dropping process: {e}");
                *slot = None;
                Err(e)
            }
        }
    }

    pub async fn shutdown(&self) {
        if let Some(mut engine) = self.engine.lock().await.take() {
            engine.quit().await;
        }
    }
}

/// Reject input that would desynchronise the UCI stream.
fn validate_fen(fen: &str) -> Result<(), EngineError> {
    let fields = fen.split_whitespace().count();
    if fen.contains('\n') || !(4..=6).contains(&fields) {
        return Err(EngineError::InvalidFen(fen.to_string()));
    }
    Ok(())
}
