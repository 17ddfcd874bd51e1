pub mod chess_com;
pub mod lichess;
pub mod openai;

use chess_core::pgn::extract_header;
use serde::Serialize;

/// A game offered by an import provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub pgn: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub date: Option<String>,
    pub url: Option<String>,
}

impl GameSummary {
    /// Fill the summary from the PGN's own headers.
    pub fn from_pgn(pgn: &str) -> Self {
        let header = |name: &str| extract_header(pgn, name).filter(|v| !v.is_empty() && v != "?");
        Self {
            pgn: pgn.to_string(),
            white: header("White").unwrap_or_else(|| "Unknown".to_string()),
            black: header("Black").unwrap_or_else(|| "Unknown".to_string()),
            result: header("Result").unwrap_or_else(|| "*".to_string()),
            date: header("UTCDate")
                .or_else(|| header("Date"))
                .filter(|d| !d.contains('?')),
            url: header("Link").or_else(|| header("Site").filter(|s| s.starts_with("http"))),
        }
    }
}

pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("ChessViewer/1.0")
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}
