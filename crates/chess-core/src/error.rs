//! Error types for the game model.

use thiserror::Error;

/// Rejections from the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("Invalid UCI move: {0}")]
    InvalidUci(String),

    #[error("Invalid SAN: {0}")]
    InvalidSan(String),

    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

/// Failures while importing PGN text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PgnError {
    #[error("PGN contains neither tags nor moves")]
    Empty,

    #[error("Invalid FEN tag: {0}")]
    InvalidFen(String),

    #[error("Unreadable move '{token}' at ply {ply}")]
    InvalidSan { ply: usize, token: String },

    #[error("Illegal move '{san}' at ply {ply}")]
    IllegalMove { ply: usize, san: String },
}

/// Failures of navigation intents. Move input and branch installation can
/// fail; cursor movement clamps instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error("Branch base {base} is outside the main line (last move index {tip})")]
    InvalidBranchBase { base: isize, tip: isize },
}
