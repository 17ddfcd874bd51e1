//! UCI engine client for position analysis.
//!
//! The engine is an owned child process behind [`EngineClient`]; callers tag
//! requests with an [`AnalysisTicket`] to discard results for positions that
//! are no longer displayed.

pub mod client;
pub mod config;
pub mod error;
pub mod eval;
pub mod stockfish;
pub mod ticket;

pub use client::EngineClient;
pub use config::EngineConfig;
pub use error::EngineError;
pub use eval::{AnalysisLimits, EvaluationLine, Score, SearchLimit};
pub use ticket::{AnalysisTicket, AnalysisTracker};
