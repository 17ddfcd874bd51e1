use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;

use super::{http_client, GameSummary};

pub struct LichessClient {
    client: Client,
    base_url: String,
}

impl LichessClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Most recent games of a user, newest first.
    pub async fn fetch_user_games(
        &self,
        username: &str,
        max_games: usize,
    ) -> Result<Vec<GameSummary>, String> {
        let url = format!("{}/api/games/user/{}", self.base_url, username);

        let params = [
            ("pgnInJson", "true".to_string()),
            ("opening", "true".to_string()),
            ("max", max_games.to_string()),
        ];

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .header("Accept", "application/x-ndjson")
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(format!("Lichess user '{username}' not found"));
        }
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| format!("Body read error: {e}"))?;

        let games = self.parse_ndjson(&text);
        tracing::info!(username, count = games.len(), "Fetched Lichess games");
        Ok(games)
    }

    /// A single game by id, as exported PGN.
    pub async fn fetch_game(&self, game_id: &str) -> Result<GameSummary, String> {
        let url = format!("{}/game/export/{}", self.base_url, game_id);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/x-chess-pgn")
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(format!("Lichess game '{game_id}' not found"));
        }
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let pgn = resp
            .text()
            .await
            .map_err(|e| format!("Body read error: {e}"))?;

        let mut summary = GameSummary::from_pgn(&pgn);
        summary
            .url
            .get_or_insert_with(|| format!("{}/{}", self.base_url, game_id));
        Ok(summary)
    }

    fn parse_ndjson(&self, text: &str) -> Vec<GameSummary> {
        let mut results = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let game_data = match serde_json::from_str::<Value>(line) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("Failed to parse Lichess game JSON: {e}");
                    continue;
                }
            };

            let Some(pgn) = game_data.get("pgn").and_then(|v| v.as_str()) else {
                continue;
            };
            if pgn.is_empty() {
                continue;
            }

            let mut summary = GameSummary::from_pgn(pgn);
            if summary.date.is_none() {
                summary.date = game_data["createdAt"]
                    .as_i64()
                    .and_then(DateTime::from_timestamp_millis)
                    .map(|dt| dt.format("%Y.%m.%d").to_string());
            }
            if let Some(id) = game_data.get("id").and_then(|v| v.as_str()) {
                summary.url = Some(format!("{}/{}", self.base_url, id));
            }
            results.push(summary);
        }

        results
    }
}
