//! Recorded half-moves.

use serde_json::Value as JsonValue;
use shakmaty::{Color, Role, Square};

/// Special-move markers carried alongside a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveFlags {
    pub castle: bool,
    pub en_passant: bool,
}

/// A single played half-move.
///
/// Records are produced by [`crate::rules`] and never change afterwards.
/// `from`/`to` follow UCI conventions (castling is king square to king
/// destination), so a record can always be replayed without its SAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub color: Color,
    pub piece: Role,
    pub from: Square,
    pub to: Square,
    pub san: String,
    pub promotion: Option<Role>,
    pub captured: Option<Role>,
    pub flags: MoveFlags,
}

impl MoveRecord {
    /// UCI rendering, e.g. `e2e4` or `e7e8q`.
    pub fn uci(&self) -> String {
        match self.promotion {
            Some(role) => format!("{}{}{}", self.from, self.to, role.char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    pub fn is_white(&self) -> bool {
        self.color.is_white()
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::json!({
            "color": if self.is_white() { "white" } else { "black" },
            "piece": self.piece.char().to_string(),
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "san": self.san,
            "uci": self.uci(),
            "promotion": self.promotion.map(|r| r.char().to_string()),
            "captured": self.captured.map(|r| r.char().to_string()),
            "castle": self.flags.castle,
            "enPassant": self.flags.en_passant,
        })
    }
}
