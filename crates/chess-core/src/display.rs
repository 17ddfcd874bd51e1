//! Move-list and status-line formatting.

use serde::Serialize;
use shakmaty::{Chess, Color, Position};

use crate::branch::GameState;
use crate::moves::MoveRecord;

/// One side of a numbered move pair. `index` is what a click on the entry
/// should navigate to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairedMove {
    pub index: isize,
    pub san: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovePair {
    pub number: usize,
    pub white: Option<PairedMove>,
    pub black: Option<PairedMove>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variation {
    pub base: isize,
    pub pairs: Vec<MovePair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveList {
    pub main: Vec<MovePair>,
    pub variation: Option<Variation>,
}

/// Number the moves in pairs, counting from the start position's fullmove
/// number and side to move.
pub fn pair_moves(start: &Chess, moves: &[MoveRecord]) -> Vec<MovePair> {
    pair_indexed(first_ply(start), moves.iter().enumerate())
}

/// Half-move count of `start` since the notional initial position.
fn first_ply(start: &Chess) -> usize {
    let fullmoves = start.fullmoves().get() as usize;
    (fullmoves - 1) * 2 + usize::from(start.turn().is_black())
}

fn side_name(color: Color) -> &'static str {
    if color.is_white() { "White" } else { "Black" }
}

fn pair_indexed<'a>(
    first_ply: usize,
    entries: impl IntoIterator<Item = (usize, &'a MoveRecord)>,
) -> Vec<MovePair> {
    let mut pairs: Vec<MovePair> = Vec::new();

    for (index, record) in entries {
        let number = (first_ply + index) / 2 + 1;
        let entry = PairedMove {
            index: index as isize,
            san: record.san.clone(),
        };
        let white_side = record.is_white();

        match pairs.last_mut() {
            Some(pair) if pair.number == number => {
                if white_side {
                    pair.white = Some(entry);
                } else {
                    pair.black = Some(entry);
                }
            }
            _ => {
                let (white, black) = if white_side {
                    (Some(entry), None)
                } else {
                    (None, Some(entry))
                };
                pairs.push(MovePair {
                    number,
                    white,
                    black,
                });
            }
        }
    }

    pairs
}

/// The move list as shown next to the board.
///
/// With a branch, the main line is cut at the divergence point and the branch
/// is listed as a variation. A branch whose first move is Black's opens with
/// a hybrid pair that repeats the main line's last White move.
pub fn move_list(state: &GameState) -> MoveList {
    let line = state.line();
    let moves = line.moves();
    let first_ply = first_ply(line.start());

    let Some(branch) = state.branch() else {
        return MoveList {
            main: pair_indexed(first_ply, moves.iter().enumerate()),
            variation: None,
        };
    };

    let upto = ((branch.base() + 1) as usize).min(moves.len());
    let main = pair_indexed(first_ply, moves[..upto].iter().enumerate());

    let first = upto;
    let mut entries: Vec<(usize, &MoveRecord)> = Vec::with_capacity(branch.len() + 1);
    let opens_with_black = branch.moves().first().is_some_and(|m| !m.is_white());
    if opens_with_black {
        if let Some(white) = first.checked_sub(1).and_then(|i| moves.get(i)) {
            if white.is_white() {
                entries.push((first - 1, white));
            }
        }
    }
    entries.extend(
        branch
            .moves()
            .iter()
            .enumerate()
            .map(|(i, m)| (first + i, m)),
    );

    MoveList {
        main,
        variation: Some(Variation {
            base: branch.base(),
            pairs: pair_indexed(first_ply, entries),
        }),
    }
}

/// One-line status for the position after `moves[index]`, numbered from
/// `start`.
pub fn describe_cursor(start: &Chess, moves: &[MoveRecord], index: isize) -> String {
    let index = index.min(moves.len() as isize - 1);
    if index < 0 {
        return format!("Start position, {} to move", side_name(start.turn()));
    }
    let index = index as usize;
    let number = (first_ply(start) + index + 1) / 2 + 1;
    let side = side_name(!moves[index].color);
    format!("Move {number}, {side} to move")
}
