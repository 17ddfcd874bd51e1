//! Engine error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine is not configured")]
    NotConfigured,

    #[error("Failed to spawn engine: {0}")]
    Spawn(String),

    #[error("Engine I/O error: {0}")]
    Io(String),

    #[error("Engine closed its output")]
    Closed,

    #[error("Engine search timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid FEN for analysis: {0}")]
    InvalidFen(String),
}
