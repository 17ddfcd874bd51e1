//! Thin wrapper over shakmaty: validates candidate moves and produces
//! [`MoveRecord`]s plus the resulting position.

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, File, Move, Position, Role, Square};

use crate::error::RulesError;
use crate::moves::{MoveFlags, MoveRecord};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN of a position, with en passant squares only when a capture is legal.
pub fn fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

pub fn position_from_fen(fen: &str) -> Result<Chess, RulesError> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| RulesError::InvalidFen(format!("{fen}: {e}")))?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| RulesError::InvalidFen(format!("{fen}: {e}")))
}

pub fn parse_square(s: &str) -> Result<Square, RulesError> {
    s.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| RulesError::InvalidSquare(s.to_string()))
}

/// Accepts `q`, `Q`, `queen` and friends.
pub fn parse_promotion(s: &str) -> Result<Role, RulesError> {
    let c = s
        .trim()
        .chars()
        .next()
        .ok_or_else(|| RulesError::InvalidPromotion(s.to_string()))?;
    match Role::from_char(c.to_ascii_lowercase()) {
        Some(role @ (Role::Queen | Role::Rook | Role::Bishop | Role::Knight)) => Ok(role),
        _ => Err(RulesError::InvalidPromotion(s.to_string())),
    }
}

/// Split `e2e4` / `e7e8q` into its parts.
pub fn parse_uci(s: &str) -> Result<(Square, Square, Option<Role>), RulesError> {
    let s = s.trim();
    if !(4..=5).contains(&s.len()) || !s.is_ascii() {
        return Err(RulesError::InvalidUci(s.to_string()));
    }
    let from = parse_square(&s[0..2]).map_err(|_| RulesError::InvalidUci(s.to_string()))?;
    let to = parse_square(&s[2..4]).map_err(|_| RulesError::InvalidUci(s.to_string()))?;
    let promotion = match s.get(4..5) {
        Some(p) => Some(parse_promotion(p).map_err(|_| RulesError::InvalidUci(s.to_string()))?),
        None => None,
    };
    Ok((from, to, promotion))
}

/// Play a move given by origin, destination and promotion.
///
/// Castling is addressed by the king's destination (`e1g1`).
pub fn play(
    pos: &Chess,
    from: Square,
    to: Square,
    promotion: Option<Role>,
) -> Result<(MoveRecord, Chess), RulesError> {
    let uci = UciMove::Normal { from, to, promotion };
    let mv = uci.to_move(pos).map_err(|_| RulesError::IllegalMove {
        mv: uci.to_string(),
        fen: fen(pos),
    })?;
    commit(pos, mv)
}

/// Play a move given in SAN. Used by the PGN importer only; stored
/// history is always replayed by squares.
pub fn play_san(pos: &Chess, san: &str) -> Result<(MoveRecord, Chess), RulesError> {
    let parsed: SanPlus = san
        .parse()
        .map_err(|_| RulesError::InvalidSan(san.to_string()))?;
    let mv = parsed.san.to_move(pos).map_err(|_| RulesError::IllegalMove {
        mv: san.to_string(),
        fen: fen(pos),
    })?;
    commit(pos, mv)
}

/// Render an engine principal variation in SAN, stopping at the first move
/// that is not legal in the line.
pub fn uci_line_to_san(pos: &Chess, pv: &[String]) -> Vec<String> {
    let mut current = pos.clone();
    let mut sans = Vec::with_capacity(pv.len());
    for uci in pv {
        let Ok((from, to, promotion)) = parse_uci(uci) else {
            break;
        };
        match play(&current, from, to, promotion) {
            Ok((record, next)) => {
                sans.push(record.san);
                current = next;
            }
            Err(_) => break,
        }
    }
    sans
}

fn commit(pos: &Chess, mv: Move) -> Result<(MoveRecord, Chess), RulesError> {
    let (from, to) = match &mv {
        Move::Castle { king, rook } => (*king, castle_destination(*king, *rook)),
        other => match other.from() {
            Some(from) => (from, other.to()),
            None => {
                return Err(RulesError::IllegalMove {
                    mv: format!("{other:?}"),
                    fen: fen(pos),
                })
            }
        },
    };

    let san = San::from_move(pos, mv.clone()).to_string();
    let mut next = pos.clone();
    next.play_unchecked(mv.clone());

    let suffix = if next.is_checkmate() {
        "#"
    } else if next.is_check() {
        "+"
    } else {
        ""
    };

    let record = MoveRecord {
        color: pos.turn(),
        piece: mv.role(),
        from,
        to,
        san: format!("{san}{suffix}"),
        promotion: mv.promotion(),
        captured: mv.capture(),
        flags: MoveFlags {
            castle: mv.is_castle(),
            en_passant: mv.is_en_passant(),
        },
    };

    Ok((record, next))
}

fn castle_destination(king: Square, rook: Square) -> Square {
    let file = if rook.file() > king.file() { File::G } else { File::C };
    Square::from_coords(file, king.rank())
}
