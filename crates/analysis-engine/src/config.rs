//! Engine configuration from environment variables

use std::env;

use crate::eval::{AnalysisLimits, SearchLimit};

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to a UCI engine binary (Stockfish or compatible)
    pub path: String,

    /// Extra command-line arguments for the engine
    pub args: Vec<String>,

    /// Search threads
    pub threads: u32,

    /// Hash table size in MB
    pub hash_mb: u32,

    /// Limits used when a request does not bring its own
    pub default_limits: AnalysisLimits,

    /// Upper bound on a single search before it is stopped
    pub search_timeout_secs: u64,
}

impl EngineConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            threads: 1,
            hash_mb: 64,
            default_limits: AnalysisLimits::default(),
            search_timeout_secs: 30,
        }
    }

    /// Load from the environment. Returns None when STOCKFISH_PATH is unset,
    /// which leaves analysis disabled.
    pub fn from_env() -> Option<Self> {
        let path = env::var("STOCKFISH_PATH").ok().filter(|p| !p.trim().is_empty())?;

        let threads = env::var("ENGINE_THREADS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let hash_mb = env::var("ENGINE_HASH_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64);

        let depth = env::var("ENGINE_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(18);

        let multipv = env::var("ENGINE_MULTIPV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let search_timeout_secs = env::var("ENGINE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Some(Self {
            path,
            args: Vec::new(),
            threads,
            hash_mb,
            default_limits: AnalysisLimits {
                limit: SearchLimit::Depth(depth),
                multipv,
            },
            search_timeout_secs,
        })
    }
}
