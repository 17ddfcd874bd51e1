//! Temporary branches and the game state that owns them.
//!
//! A branch is an exploratory continuation that diverges from the main line
//! after `base` (or from the start position when `base == -1`). At most one
//! branch is live at a time. It lives inside [`Cursor::Branch`], so "a branch
//! exists" and "the cursor is on the branch" cannot disagree.

use shakmaty::Chess;
use tracing::warn;

use crate::error::NavError;
use crate::line::MainLine;
use crate::moves::MoveRecord;
use crate::rules;

#[derive(Debug, Clone)]
pub struct Branch {
    base: isize,
    moves: Vec<MoveRecord>,
    position: Chess,
    fen: String,
}

impl Branch {
    pub fn new(base: isize, first: MoveRecord, position: Chess) -> Self {
        let fen = rules::fen(&position);
        Self {
            base,
            moves: vec![first],
            position,
            fen,
        }
    }

    pub fn extend(&mut self, mv: MoveRecord, position: Chess) {
        self.moves.push(mv);
        self.fen = rules::fen(&position);
        self.position = position;
    }

    /// Main-line index the branch diverges after.
    pub fn base(&self) -> isize {
        self.base
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

    /// Position after the last branch move.
    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Combined index of the last branch move.
    pub fn tip(&self) -> isize {
        self.base + self.moves.len() as isize
    }
}

/// What is currently displayed.
#[derive(Debug, Clone)]
pub enum Cursor {
    /// A main-line position; `-1` is the start position.
    MainLine { index: isize },
    /// Inside a branch. `index` uses combined addressing and is always
    /// greater than `branch.base()`.
    Branch { branch: Branch, index: isize },
}

impl Cursor {
    pub fn index(&self) -> isize {
        match self {
            Cursor::MainLine { index } | Cursor::Branch { index, .. } => *index,
        }
    }

    pub fn branch(&self) -> Option<&Branch> {
        match self {
            Cursor::MainLine { .. } => None,
            Cursor::Branch { branch, .. } => Some(branch),
        }
    }
}

/// Main line plus cursor.
#[derive(Debug, Clone)]
pub struct GameState {
    line: MainLine,
    cursor: Cursor,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(MainLine::new())
    }
}

impl GameState {
    /// Fresh state at the start position.
    pub fn new(line: MainLine) -> Self {
        Self {
            line,
            cursor: Cursor::MainLine { index: -1 },
        }
    }

    pub fn line(&self) -> &MainLine {
        &self.line
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn index(&self) -> isize {
        self.cursor.index()
    }

    pub fn branch(&self) -> Option<&Branch> {
        self.cursor.branch()
    }

    /// Record a move played from the displayed position.
    ///
    /// At the tip of the main line (with no branch) the move extends the main
    /// line. Behind the tip it opens a branch based at the current index. On a
    /// branch it extends the branch. The recorded continuation is never
    /// overwritten.
    pub fn apply_move(self, mv: MoveRecord, resulting: Chess) -> GameState {
        let GameState { mut line, cursor } = self;
        let cursor = match cursor {
            Cursor::MainLine { index } if index >= line.tip() => {
                line.push(mv);
                Cursor::MainLine { index: line.tip() }
            }
            Cursor::MainLine { index } => {
                let branch = Branch::new(index, mv, resulting);
                let index = branch.tip();
                Cursor::Branch { branch, index }
            }
            Cursor::Branch { mut branch, .. } => {
                branch.extend(mv, resulting);
                let index = branch.tip();
                Cursor::Branch { branch, index }
            }
        };
        GameState { line, cursor }
    }

    /// Install or drop the branch. An installed branch puts the cursor on its
    /// last move.
    ///
    /// The base must be a main-line index before the last move (or -1); a
    /// branch anywhere else would have nothing to diverge from. The state is
    /// left unchanged on error.
    pub fn set_branch(&mut self, branch: Option<Branch>) -> Result<(), NavError> {
        match branch {
            Some(branch) => {
                let tip = self.line.tip();
                if branch.base() < -1 || branch.base() >= tip {
                    warn!(base = branch.base(), tip, "Rejected branch outside the main line");
                    return Err(NavError::InvalidBranchBase {
                        base: branch.base(),
                        tip,
                    });
                }
                let index = branch.tip();
                self.cursor = Cursor::Branch { branch, index };
            }
            None => self.clear_branch(),
        }
        Ok(())
    }

    /// Drop the branch, falling back to its divergence point on the main line.
    pub fn clear_branch(&mut self) {
        if let Cursor::Branch { branch, .. } = &self.cursor {
            self.cursor = Cursor::MainLine {
                index: branch.base(),
            };
        }
    }

    /// Move the cursor to a main-line index (clamped), dropping any branch.
    pub(crate) fn set_main_index(&mut self, index: isize) {
        self.cursor = Cursor::MainLine {
            index: self.line.clamp(index),
        };
    }

    /// Move the combined index while staying on the current branch.
    pub(crate) fn set_branch_index(&mut self, index: isize) {
        if let Cursor::Branch {
            branch,
            index: current,
        } = &mut self.cursor
        {
            *current = index.max(branch.base() + 1);
        }
    }
}
