//! Position reconstruction by replaying the main line.

use shakmaty::Chess;
use tracing::warn;

use crate::line::MainLine;
use crate::rules;

/// Outcome of a replay: the reached position and any moves that had to be
/// skipped because the rules engine rejected them.
#[derive(Debug, Clone)]
pub struct Replay {
    pub position: Chess,
    pub skipped: Vec<usize>,
}

impl Replay {
    pub fn fen(&self) -> String {
        rules::fen(&self.position)
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Replay `line` from its start position through move `index` inclusive.
///
/// `-1` yields the start position. Moves are replayed by origin, destination
/// and promotion, never by SAN. A move the rules engine rejects is logged and
/// skipped; replay continues from the last position that applied cleanly.
pub fn compute_position(line: &MainLine, index: isize) -> Replay {
    let mut position = line.start().clone();
    let mut skipped = Vec::new();

    let count = if index < 0 {
        0
    } else {
        (index as usize + 1).min(line.len())
    };

    for (i, mv) in line.moves().iter().take(count).enumerate() {
        match rules::play(&position, mv.from, mv.to, mv.promotion) {
            Ok((_, next)) => position = next,
            Err(e) => {
                warn!(index = i, san = %mv.san, error = %e, "Skipping move that does not apply during replay");
                skipped.push(i);
            }
        }
    }

    Replay { position, skipped }
}
