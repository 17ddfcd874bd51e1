//! PGN import and export with a lightweight regex-based parser.

use std::sync::LazyLock;

use regex::Regex;
use shakmaty::Chess;

use crate::error::{PgnError, RulesError};
use crate::game_data::GameMetadata;
use crate::line::MainLine;
use crate::rules;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[(\w+)\s+"((?:[^"\\]|\\.)*)"\]"#).expect("tag pattern")
});
static TAG_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[\w+\s+"(?:[^"\\]|\\.)*"\s*\]"#).expect("tag line pattern")
});
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("comment pattern"));
static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m);.*$").expect("line comment pattern"));
static NAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\d+").expect("nag pattern"));
static VARIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("variation pattern"));
static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.+").expect("move number pattern"));

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// A parsed game: header metadata plus a replayable main line.
#[derive(Debug, Clone)]
pub struct ImportedGame {
    pub metadata: GameMetadata,
    pub line: MainLine,
}

/// Parse PGN text (or bare movetext) into a game.
///
/// Fails when the text has neither tags nor moves, when a `[FEN]` tag does
/// not describe a legal position, or when a move cannot be read or played.
pub fn parse_pgn(pgn: &str) -> Result<ImportedGame, PgnError> {
    let tags = parse_tags(pgn);
    let tokens = movetext_tokens(pgn);

    if tags.is_empty() && tokens.is_empty() {
        return Err(PgnError::Empty);
    }

    let start = match tag(&tags, "FEN") {
        Some(fen) => {
            rules::position_from_fen(fen).map_err(|_| PgnError::InvalidFen(fen.to_string()))?
        }
        None => Chess::default(),
    };

    let mut line = MainLine::from_position(start.clone());
    let mut pos = start;

    for (i, token) in tokens.iter().enumerate() {
        let ply = i + 1;
        match rules::play_san(&pos, token) {
            Ok((record, next)) => {
                line.push(record);
                pos = next;
            }
            Err(RulesError::InvalidSan(_)) => {
                return Err(PgnError::InvalidSan {
                    ply,
                    token: token.clone(),
                })
            }
            Err(_) => {
                return Err(PgnError::IllegalMove {
                    ply,
                    san: token.clone(),
                })
            }
        }
    }

    Ok(ImportedGame {
        metadata: metadata_from_tags(&tags),
        line,
    })
}

fn parse_tags(pgn: &str) -> Vec<(String, String)> {
    TAG_RE
        .captures_iter(pgn)
        .map(|cap| (cap[1].to_string(), cap[2].replace("\\\"", "\"")))
        .collect()
}

fn tag<'a>(tags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

fn metadata_from_tags(tags: &[(String, String)]) -> GameMetadata {
    let text = |name: &str| tag(tags, name).filter(|v| *v != "?").map(str::to_string);
    let defaults = GameMetadata::default();

    GameMetadata {
        event: text("Event"),
        site: text("Site"),
        date: text("Date").filter(|d| d != "????.??.??"),
        round: text("Round").filter(|r| r != "-"),
        white: text("White").unwrap_or(defaults.white),
        black: text("Black").unwrap_or(defaults.black),
        result: text("Result").unwrap_or(defaults.result),
        white_elo: tag(tags, "WhiteElo").and_then(|v| v.parse().ok()),
        black_elo: tag(tags, "BlackElo").and_then(|v| v.parse().ok()),
        time_control: text("TimeControl"),
        eco: text("ECO"),
        link: text("Link"),
    }
}

/// SAN tokens of the main line, with headers, comments, NAGs, variations,
/// move numbers and annotation glyphs removed.
fn movetext_tokens(pgn: &str) -> Vec<String> {
    let text = TAG_LINE_RE.replace_all(pgn, " ");
    let text = COMMENT_RE.replace_all(&text, " ");
    let text = LINE_COMMENT_RE.replace_all(&text, " ");
    let text = NAG_RE.replace_all(&text, " ");

    // Variations nest; peel the innermost ones until none remain.
    let mut text = text.into_owned();
    while VARIATION_RE.is_match(&text) {
        text = VARIATION_RE.replace_all(&text, " ").into_owned();
    }

    let mut tokens = Vec::new();
    for raw in text.split_whitespace() {
        if RESULTS.contains(&raw) {
            break;
        }
        let token = MOVE_NUMBER_RE.replace(raw, "");
        let token = token.trim_end_matches(['!', '?']);
        if token.is_empty() {
            continue;
        }
        // Castling is often written with zeros.
        if token.starts_with("0-0") {
            tokens.push(token.replace('0', "O"));
        } else {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Render a main line as PGN with the Seven Tag Roster.
pub fn export_pgn(metadata: &GameMetadata, line: &MainLine) -> String {
    let mut out = String::new();

    let roster = [
        ("Event", metadata.event.as_deref().unwrap_or("?")),
        ("Site", metadata.site.as_deref().unwrap_or("?")),
        ("Date", metadata.date.as_deref().unwrap_or("????.??.??")),
        ("Round", metadata.round.as_deref().unwrap_or("?")),
        ("White", metadata.white.as_str()),
        ("Black", metadata.black.as_str()),
        ("Result", metadata.result.as_str()),
    ];
    for (key, value) in roster {
        out.push_str(&format!("[{key} \"{}\"]\n", value.replace('"', "\\\"")));
    }
    if !line.is_standard_start() {
        out.push_str("[SetUp \"1\"]\n");
        out.push_str(&format!("[FEN \"{}\"]\n", line.start_fen()));
    }
    out.push('\n');

    let start_fen = line.start_fen();
    let mut number: usize = start_fen
        .split(' ')
        .nth(5)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);

    let mut tokens = Vec::with_capacity(line.len() * 3 / 2 + 1);
    for (i, mv) in line.moves().iter().enumerate() {
        if mv.is_white() {
            tokens.push(format!("{number}."));
        } else {
            if i == 0 {
                tokens.push(format!("{number}..."));
            }
            number += 1;
        }
        tokens.push(mv.san.clone());
    }
    tokens.push(metadata.result.clone());

    let mut width = 0;
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            if width + 1 + token.len() > 80 {
                out.push('\n');
                width = 0;
            } else {
                out.push(' ');
                width += 1;
            }
        }
        out.push_str(token);
        width += token.len();
    }
    out.push('\n');
    out
}

/// Extract a string value from a PGN header (e.g. WhiteTitle, BlackTitle).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    tag(&parse_tags(pgn), header_name).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::compute_position;

    #[test]
    fn test_parse_pgn_basic() {
        let pgn = r#"[Event "Casual"]
[Site "Berlin"]
[Date "2025.01.15"]
[Round "1"]
[White "Player1"]
[Black "Player2"]
[Result "1-0"]
[WhiteElo "1500"]

1. e4 e5 2. Nf3 Nc6 1-0"#;

        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.metadata.event.as_deref(), Some("Casual"));
        assert_eq!(game.metadata.site.as_deref(), Some("Berlin"));
        assert_eq!(game.metadata.round.as_deref(), Some("1"));
        assert_eq!(game.metadata.white, "Player1");
        assert_eq!(game.metadata.black, "Player2");
        assert_eq!(game.metadata.result, "1-0");
        assert_eq!(game.metadata.white_elo, Some(1500));
        assert_eq!(game.metadata.black_elo, None);
        assert_eq!(game.line.len(), 4);
        assert_eq!(game.line.moves()[2].san, "Nf3");
    }

    #[test]
    fn test_bare_movetext_is_accepted() {
        let game = parse_pgn("1.e4 c5 2.Nf3 d6").unwrap();
        assert_eq!(game.line.len(), 4);
        assert_eq!(game.metadata, GameMetadata::default());
    }

    #[test]
    fn test_comments_variations_and_nags_are_ignored() {
        let pgn = "1. e4 {best by test} e5 (1... c5 2. Nf3 (2. c3 d5) d6) 2. Nf3!? $1 ; aside\nNc6 *";
        let game = parse_pgn(pgn).unwrap();
        let sans: Vec<&str> = game.line.moves().iter().map(|m| m.san.as_str()).collect();
        assert_eq!(sans, vec!["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_fen_tag_sets_start_position() {
        let pgn = r#"[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 b - - 0 1"]

1... Kd7 2. e4 *"#;
        let game = parse_pgn(pgn).unwrap();
        assert!(!game.line.is_standard_start());
        assert_eq!(game.line.len(), 2);
        assert_eq!(
            compute_position(&game.line, 1).fen(),
            "8/3k4/8/8/4P3/8/8/4K3 b - - 0 2"
        );
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert_eq!(parse_pgn("").unwrap_err(), PgnError::Empty);
        assert_eq!(parse_pgn("  { just a comment } *").unwrap_err(), PgnError::Empty);
    }

    #[test]
    fn test_tags_without_moves_load_empty_game() {
        let game = parse_pgn(r#"[White "A"] [Black "B"]"#).unwrap();
        assert!(game.line.is_empty());
        assert_eq!(game.metadata.white, "A");
    }

    #[test]
    fn test_illegal_move_reports_ply() {
        let err = parse_pgn("1. e4 e5 2. Ke3").unwrap_err();
        assert_eq!(
            err,
            PgnError::IllegalMove {
                ply: 3,
                san: "Ke3".to_string()
            }
        );
        assert!(matches!(
            parse_pgn("hello world").unwrap_err(),
            PgnError::InvalidSan { ply: 1, .. }
        ));
    }

    #[test]
    fn test_bad_fen_tag_is_rejected() {
        let err = parse_pgn(r#"[FEN "garbage"] 1. e4"#).unwrap_err();
        assert!(matches!(err, PgnError::InvalidFen(_)));
    }

    #[test]
    fn test_export_reimports_to_same_line() {
        let game = parse_pgn(
            r#"[White "Anderssen"] [Black "Kieseritzky"] [Result "1-0"]
1. e4 e5 2. f4 exf4 3. Bc4 Qh4+ 4. Kf1 b5 1-0"#,
        )
        .unwrap();
        let text = export_pgn(&game.metadata, &game.line);
        assert!(text.starts_with("[Event \"?\"]\n"));
        assert!(text.contains("[White \"Anderssen\"]"));
        assert!(text.contains("1. e4 e5 2. f4 exf4 3. Bc4 Qh4+ 4. Kf1 b5 1-0"));

        let again = parse_pgn(&text).unwrap();
        assert_eq!(again.line.moves(), game.line.moves());
        assert_eq!(again.metadata.white, "Anderssen");
    }

    #[test]
    fn test_export_black_first_uses_ellipsis() {
        let game = parse_pgn(r#"[FEN "4k3/8/8/8/8/8/4P3/4K3 b - - 0 7"] 7... Kd7"#).unwrap();
        let text = export_pgn(&game.metadata, &game.line);
        assert!(text.contains("[SetUp \"1\"]"));
        assert!(text.contains("7... Kd7 *"));
    }

    #[test]
    fn test_extract_header() {
        let pgn = r#"[WhiteElo "1500"]
[BlackElo "1600"]"#;

        assert_eq!(extract_header(pgn, "WhiteElo").as_deref(), Some("1500"));
        assert_eq!(extract_header(pgn, "BlackElo").as_deref(), Some("1600"));
        assert_eq!(extract_header(pgn, "Missing"), None);
    }

    #[test]
    fn test_zero_castling_is_accepted() {
        let game = parse_pgn("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. 0-0 Nf6 5. d3 0-0 *").unwrap();
        let sans: Vec<&str> = game.line.moves().iter().map(|m| m.san.as_str()).collect();
        assert_eq!(sans[6], "O-O");
        assert_eq!(sans[9], "O-O");
        assert!(game.line.moves()[6].flags.castle);
    }

    #[test]
    fn test_bracket_inside_tag_value_is_not_movetext() {
        let game = parse_pgn("[Event \"Blitz [rated]\"]\n\n1. e4 e5").unwrap();
        assert_eq!(game.metadata.event.as_deref(), Some("Blitz [rated]"));
        assert_eq!(game.line.len(), 2);

        let escaped = parse_pgn("[White \"A \\\"]\\\" B\"]\n1. d4").unwrap();
        assert_eq!(escaped.line.len(), 1);
    }
}
