#![allow(dead_code)]

use analysis_engine::{EngineClient, EngineConfig};
use reqwest::Client;
use serde_json::{json, Value};
use server::config::Config;
use server::AppState;

/// Nothing listens on the discard port, so outbound calls fail fast.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

pub const OPERA_GAME: &str = r#"[Event "Paris Opera"]
[Site "Paris FRA"]
[Date "1858.??.??"]
[Round "?"]
[White "Paul Morphy"]
[Black "Duke Karl / Count Isouard"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 {This is a weak move already.} 4. dxe5 Bxf3
5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7 8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5
11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7 14. Rd1 Qe6 15. Bxd7+ Nxd7
16. Qb8+ Nxb8 17. Rd8# 1-0"#;

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /api/sessions and return the new id.
    pub async fn create_session(&self) -> String {
        let body: Value = self
            .client
            .post(self.url("/api/sessions"))
            .send()
            .await
            .expect("Failed to create session")
            .json()
            .await
            .expect("Invalid session JSON");
        body["id"].as_str().expect("session id").to_string()
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn load_pgn(&self, id: &str, pgn: &str) -> Value {
        let resp = self
            .post(&format!("/api/sessions/{id}/pgn"), json!({ "pgn": pgn }))
            .await;
        assert_eq!(resp.status(), 200, "PGN load failed");
        resp.json().await.expect("Invalid view JSON")
    }

    pub async fn navigate(&self, id: &str, action: Value) -> Value {
        let resp = self
            .post(&format!("/api/sessions/{id}/navigate"), action)
            .await;
        assert_eq!(resp.status(), 200, "navigate failed");
        resp.json().await.expect("Invalid view JSON")
    }

    pub async fn play(&self, id: &str, uci: &str) -> reqwest::Response {
        self.post(&format!("/api/sessions/{id}/moves"), json!({ "uci": uci }))
            .await
    }
}

/// Config that never reaches real providers.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        engine: None,
        openai_api_key: Some("test-key".to_string()),
        openai_model: "gpt-4o-mini".to_string(),
        openai_base_url: UNREACHABLE_URL.to_string(),
        chess_com_api_url: UNREACHABLE_URL.to_string(),
        lichess_api_url: UNREACHABLE_URL.to_string(),
        http_timeout_secs: 5,
    }
}

/// Serve the router on an ephemeral port.
pub async fn spawn_app(config: Config, engine: Option<EngineClient>) -> TestApp {
    let app = server::app(AppState::new(config, engine));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: Client::new(),
    }
}

pub async fn spawn_default_app() -> TestApp {
    spawn_app(test_config(), None).await
}

/// A scripted stand-in for a UCI engine, run through `/bin/sh`.
pub fn fake_engine(name: &str, script: &str) -> EngineConfig {
    let path = std::env::temp_dir().join(format!(
        "fake-uci-{}-{}.sh",
        std::process::id(),
        name
    ));
    std::fs::write(&path, script).expect("Failed to write fake engine");

    let mut config = EngineConfig::new("/bin/sh");
    config.args = vec![path.to_string_lossy().into_owned()];
    config.search_timeout_secs = 2;
    config
}

/// Answers every search instantly with three ranked lines.
pub const FAKE_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci)
      echo "id name FakeFish"
      echo "uciok"
      ;;
    isready)
      echo "readyok"
      ;;
    go*)
      echo "info depth 1 multipv 1 score cp 20 pv e2e4"
      echo "info string thinking"
      echo "info depth 5 seldepth 7 multipv 1 score cp 35 nodes 1000 pv e2e4 e7e5"
      echo "info depth 5 seldepth 7 multipv 2 score cp 10 nodes 1000 pv d2d4 d7d5"
      echo "info depth 5 seldepth 7 multipv 3 score mate 2 nodes 1000 pv g1f3"
      echo "bestmove e2e4 ponder e7e5"
      ;;
    quit)
      exit 0
      ;;
  esac
done
"#;
