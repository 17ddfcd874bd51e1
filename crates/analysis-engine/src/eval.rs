//! Structured evaluation records parsed from UCI `info` lines.

use serde::{Deserialize, Serialize};

/// Engine score, from the side to move's point of view as UCI reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Score {
    #[serde(rename = "centipawn")]
    Centipawns(i32),
    /// Mate in N moves (positive = side to move mates)
    Mate(i32),
}

impl Score {
    /// Flip into White's point of view.
    pub fn white_pov(self, white_to_move: bool) -> Score {
        if white_to_move {
            return self;
        }
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::Mate(m) => Score::Mate(-m),
        }
    }

    /// Short human form: `+0.35`, `-1.20`, `M3`, `-M2`.
    pub fn display(&self) -> String {
        match self {
            Score::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Score::Mate(m) if *m < 0 => format!("-M{}", -m),
            Score::Mate(m) => format!("M{m}"),
        }
    }
}

/// One principal variation of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationLine {
    /// 1-based MultiPV rank
    pub multipv: u32,
    pub score: Score,
    pub depth: u32,
    /// Best continuation in UCI notation
    pub pv: Vec<String>,
}

impl EvaluationLine {
    pub fn best_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchLimit {
    Depth(u32),
    Nodes(u64),
    MoveTimeMs(u64),
}

impl SearchLimit {
    pub fn go_command(&self) -> String {
        match self {
            SearchLimit::Depth(d) => format!("go depth {d}"),
            SearchLimit::Nodes(n) => format!("go nodes {n}"),
            SearchLimit::MoveTimeMs(ms) => format!("go movetime {ms}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLimits {
    pub limit: SearchLimit,
    pub multipv: u32,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            limit: SearchLimit::Depth(18),
            multipv: 3,
        }
    }
}

/// Parse an `info` line into an evaluation. Lines without both a score and a
/// principal variation (currmove updates, `info string`, bound-only lines)
/// yield None.
pub fn parse_info_line(line: &str) -> Option<EvaluationLine> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.first() != Some(&"info") {
        return None;
    }

    let mut depth = None;
    let mut multipv = 1;
    let mut score = None;
    let mut pv = Vec::new();

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                depth = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "multipv" => {
                multipv = parts.get(i + 1).and_then(|v| v.parse().ok()).unwrap_or(1);
                i += 2;
            }
            "score" => {
                let value = parts.get(i + 2).and_then(|v| v.parse().ok());
                score = match (parts.get(i + 1), value) {
                    (Some(&"cp"), Some(v)) => Some(Score::Centipawns(v)),
                    (Some(&"mate"), Some(v)) => Some(Score::Mate(v)),
                    _ => None,
                };
                i += 3;
                if matches!(parts.get(i), Some(&"lowerbound") | Some(&"upperbound")) {
                    return None;
                }
            }
            "pv" => {
                pv = parts[i + 1..]
                    .iter()
                    .take_while(|p| **p != "bmc" && **p != "string")
                    .map(|p| p.to_string())
                    .collect();
                break;
            }
            "string" => return None,
            _ => i += 1,
        }
    }

    if pv.is_empty() {
        return None;
    }

    Some(EvaluationLine {
        multipv,
        score: score?,
        depth: depth.unwrap_or(0),
        pv,
    })
}
