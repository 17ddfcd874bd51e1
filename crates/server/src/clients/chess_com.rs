use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;

use super::{http_client, GameSummary};

pub struct ChessComClient {
    client: Client,
    base_url: String,
}

impl ChessComClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the list of monthly archives that actually contain games.
    /// Returns (year, month) pairs sorted newest-first.
    pub async fn fetch_archives(&self, username: &str) -> Result<Vec<(i32, u32)>, String> {
        let url = format!(
            "{}/pub/player/{}/games/archives",
            self.base_url,
            username.to_lowercase()
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Archives request error: {e}"))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(format!("Chess.com user '{username}' not found"));
        }
        if !resp.status().is_success() {
            return Err(format!("Archives HTTP {}", resp.status()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| format!("Archives JSON parse error: {e}"))?;

        Ok(parse_archives(&data))
    }

    /// Games of one monthly archive, oldest first as Chess.com lists them.
    pub async fn fetch_month(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<GameSummary>, String> {
        let url = format!(
            "{}/pub/player/{}/games/{}/{:02}",
            self.base_url,
            username.to_lowercase(),
            year,
            month
        );

        // Rate limit
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| format!("JSON parse error: {e}"))?;

        Ok(parse_month(&data))
    }

    /// Most recent standard-chess games, newest first, walking the monthly
    /// archives backwards until `limit` games are collected.
    pub async fn fetch_recent_games(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<GameSummary>, String> {
        let mut games = Vec::new();
        if limit == 0 {
            return Ok(games);
        }

        for (year, month) in self.fetch_archives(username).await? {
            let mut month_games = self.fetch_month(username, year, month).await?;
            month_games.reverse();
            games.extend(month_games);
            if games.len() >= limit {
                break;
            }
        }

        games.truncate(limit);
        tracing::info!(username, count = games.len(), "Fetched Chess.com games");
        Ok(games)
    }
}

fn parse_archives(data: &Value) -> Vec<(i32, u32)> {
    let mut months: Vec<(i32, u32)> = data["archives"]
        .as_array()
        .map(|a| a.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(|v| {
            // URLs look like "https://api.chess.com/pub/player/username/games/2024/03"
            let s = v.as_str()?;
            let parts: Vec<&str> = s.trim_end_matches('/').rsplit('/').collect();
            let month: u32 = parts.first()?.parse().ok()?;
            let year: i32 = parts.get(1)?.parse().ok()?;
            Some((year, month))
        })
        .collect();

    months.sort_by(|a, b| b.cmp(a));
    months
}

fn parse_month(data: &Value) -> Vec<GameSummary> {
    let games = data["games"].as_array().map(|a| a.as_slice()).unwrap_or_default();
    let mut results = Vec::new();

    for game in games {
        // Skip variant games
        let rules = game.get("rules").and_then(|v| v.as_str()).unwrap_or("chess");
        if rules != "chess" {
            continue;
        }

        let Some(pgn) = game.get("pgn").and_then(|v| v.as_str()) else {
            continue;
        };

        let mut summary = GameSummary::from_pgn(pgn);
        if let Some(name) = game["white"]["username"].as_str() {
            summary.white = name.to_string();
        }
        if let Some(name) = game["black"]["username"].as_str() {
            summary.black = name.to_string();
        }
        if summary.date.is_none() {
            summary.date = game["end_time"]
                .as_i64()
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.format("%Y.%m.%d").to_string());
        }
        if let Some(url) = game.get("url").and_then(|v| v.as_str()) {
            summary.url = Some(url.to_string());
        }
        results.push(summary);
    }

    results
}
