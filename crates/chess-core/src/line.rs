//! The recorded main line of a game.

use shakmaty::Chess;

use crate::moves::MoveRecord;
use crate::rules;

/// Start position plus the ordered, gapless list of recorded moves.
#[derive(Debug, Clone)]
pub struct MainLine {
    start: Chess,
    moves: Vec<MoveRecord>,
}

impl Default for MainLine {
    fn default() -> Self {
        Self::new()
    }
}

impl MainLine {
    /// An empty line from the standard initial position.
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    pub fn from_position(start: Chess) -> Self {
        Self {
            start,
            moves: Vec::new(),
        }
    }

    pub fn start(&self) -> &Chess {
        &self.start
    }

    pub fn start_fen(&self) -> String {
        rules::fen(&self.start)
    }

    pub fn is_standard_start(&self) -> bool {
        self.start_fen() == rules::STANDARD_START_FEN
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Index of the last move, or -1 for an empty line.
    pub fn tip(&self) -> isize {
        self.moves.len() as isize - 1
    }

    /// Clamp a cursor index into `-1..=tip`.
    pub fn clamp(&self, index: isize) -> isize {
        index.clamp(-1, self.tip())
    }

    pub fn push(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }
}
