//! UCI engine process wrapper (async I/O)

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::eval::{parse_info_line, AnalysisLimits, EvaluationLine};

/// A running UCI engine. Owned by exactly one [`crate::EngineClient`].
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: Option<String>,
    search_timeout: Duration,
}

impl StockfishEngine {
    /// Spawn the engine process and complete the UCI handshake
    pub async fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut process = Command::new(&config.path)
            .args(&config.args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {e}", config.path)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EngineError::Spawn("engine stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
            name: None,
            search_timeout: Duration::from_secs(config.search_timeout_secs),
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        engine
            .send(&format!("setoption name Threads value {}", config.threads))
            .await?;
        engine
            .send(&format!("setoption name Hash value {}", config.hash_mb))
            .await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        info!(path = %config.path, name = ?engine.name, "Engine ready");
        Ok(engine)
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "UCI <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| EngineError::Io(format!("write failed: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Io(format!("flush failed: {e}")))?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| EngineError::Io(format!("read failed: {e}")))?;
        if n == 0 {
            return Err(EngineError::Closed);
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "UCI >");
        Ok(trimmed)
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            let line = self.read_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = Some(name.to_string());
            }
            if line == expected {
                return Ok(());
            }
        }
    }

    /// Search `fen` and return the final line per MultiPV rank, best first.
    pub async fn analyse(
        &mut self,
        fen: &str,
        limits: &AnalysisLimits,
    ) -> Result<Vec<EvaluationLine>, EngineError> {
        let multipv = limits.multipv.max(1);
        self.send(&format!("setoption name MultiPV value {multipv}"))
            .await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&limits.limit.go_command()).await?;

        let mut lines: BTreeMap<u32, EvaluationLine> = BTreeMap::new();
        let deadline = tokio::time::Instant::now() + self.search_timeout;

        loop {
            let line = match tokio::time::timeout_at(deadline, self.read_line()).await {
                Ok(line) => line?,
                Err(_) => {
                    warn!(fen, "Search exceeded its time budget, stopping");
                    self.send("stop").await?;
                    // One more budget to drain up to bestmove.
                    let budget = self.search_timeout;
                    match tokio::time::timeout(budget, self.drain_to_bestmove(&mut lines)).await {
                        Ok(drained) => drained?,
                        Err(_) => return Err(EngineError::Timeout(budget.as_secs())),
                    }
                    break;
                }
            };

            if line.starts_with("bestmove") {
                break;
            }
            if let Some(eval) = parse_info_line(&line) {
                if eval.multipv <= multipv {
                    lines.insert(eval.multipv, eval);
                }
            }
        }

        Ok(lines.into_values().collect())
    }

    async fn drain_to_bestmove(
        &mut self,
        lines: &mut BTreeMap<u32, EvaluationLine>,
    ) -> Result<(), EngineError> {
        loop {
            let line = self.read_line().await?;
            if line.starts_with("bestmove") {
                return Ok(());
            }
            if let Some(eval) = parse_info_line(&line) {
                lines.insert(eval.multipv, eval);
            }
        }
    }

    /// Send quit and wait for the process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}
