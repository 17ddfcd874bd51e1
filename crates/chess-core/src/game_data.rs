use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameMetadata {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub white_elo: Option<i32>,
    pub black_elo: Option<i32>,
    pub time_control: Option<String>,
    pub eco: Option<String>,
    pub link: Option<String>,
}

impl Default for GameMetadata {
    fn default() -> Self {
        Self {
            event: None,
            site: None,
            date: None,
            round: None,
            white: "Unknown".to_string(),
            black: "Unknown".to_string(),
            result: "*".to_string(),
            white_elo: None,
            black_elo: None,
            time_control: None,
            eco: None,
            link: None,
        }
    }
}
