//! Navigation controller: turns user intents into cursor and branch changes
//! and derives the displayed position.

use shakmaty::{Chess, Role, Square};
use tracing::debug;

use crate::branch::{Branch, Cursor, GameState};
use crate::display::{self, MoveList};
use crate::error::{NavError, RulesError};
use crate::line::MainLine;
use crate::moves::MoveRecord;
use crate::position::compute_position;
use crate::rules;

/// Navigation buttons and move-list clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    First,
    Previous,
    Next,
    Last,
    Jump(isize),
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    state: GameState,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start browsing `line` from its start position.
    pub fn from_line(line: MainLine) -> Self {
        Self {
            state: GameState::new(line),
        }
    }

    /// Replace the game wholesale (PGN load, import). Any branch is dropped
    /// and the cursor goes to the start position.
    pub fn load(&mut self, line: MainLine) {
        self.state = GameState::new(line);
    }

    pub fn new_game(&mut self) {
        self.load(MainLine::new());
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn line(&self) -> &MainLine {
        self.state.line()
    }

    pub fn branch(&self) -> Option<&Branch> {
        self.state.branch()
    }

    pub fn index(&self) -> isize {
        self.state.index()
    }

    pub fn first(&mut self) -> bool {
        self.apply(Intent::First)
    }

    pub fn previous(&mut self) -> bool {
        self.apply(Intent::Previous)
    }

    pub fn next(&mut self) -> bool {
        self.apply(Intent::Next)
    }

    pub fn last(&mut self) -> bool {
        self.apply(Intent::Last)
    }

    pub fn jump_to(&mut self, index: isize) -> bool {
        self.apply(Intent::Jump(index))
    }

    /// Apply a navigation intent. Returns whether the cursor moved or the
    /// branch changed. Boundaries clamp instead of failing.
    pub fn apply(&mut self, intent: Intent) -> bool {
        let before = (self.state.index(), self.state.branch().is_some());
        let tip = self.state.line().tip();

        match intent {
            Intent::First => self.state.set_main_index(-1),
            Intent::Last => self.state.set_main_index(tip),
            Intent::Jump(target) => self.state.set_main_index(target),
            Intent::Previous => match self.state.cursor() {
                Cursor::Branch { branch, index } if *index == branch.base() + 1 => {
                    self.state.clear_branch();
                }
                Cursor::Branch { index, .. } => {
                    let index = *index - 1;
                    self.state.set_branch_index(index);
                }
                Cursor::MainLine { index } => {
                    let index = (*index - 1).max(-1);
                    self.state.set_main_index(index);
                }
            },
            Intent::Next => match self.state.cursor() {
                Cursor::Branch { index, .. } => {
                    if *index < tip {
                        let index = *index + 1;
                        self.state.set_branch_index(index);
                    }
                }
                Cursor::MainLine { index } => {
                    let index = (*index + 1).min(tip);
                    self.state.set_main_index(index);
                }
            },
        }

        let after = (self.state.index(), self.state.branch().is_some());
        if before != after {
            debug!(?intent, index = after.0, on_branch = after.1, "Cursor moved");
        }
        before != after
    }

    /// Play a move from the displayed position.
    ///
    /// A pawn reaching the last rank without an explicit promotion piece is
    /// promoted to a queen.
    pub fn play_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<&MoveRecord, NavError> {
        let current = self.displayed_position();
        let (record, resulting) = match rules::play(&current, from, to, promotion) {
            Ok(played) => played,
            Err(RulesError::IllegalMove { .. }) if promotion.is_none() => {
                rules::play(&current, from, to, Some(Role::Queen)).map_err(|_| {
                    RulesError::IllegalMove {
                        mv: format!("{from}{to}"),
                        fen: rules::fen(&current),
                    }
                })?
            }
            Err(e) => return Err(e.into()),
        };

        let state = std::mem::take(&mut self.state);
        self.state = state.apply_move(record, resulting);
        debug!(index = self.state.index(), on_branch = self.state.branch().is_some(), "Move played");

        self.last_played()
            .ok_or_else(|| NavError::Rules(RulesError::InvalidUci(format!("{from}{to}"))))
    }

    /// Play a move given in UCI notation.
    pub fn play_uci(&mut self, uci: &str) -> Result<&MoveRecord, NavError> {
        let (from, to, promotion) = rules::parse_uci(uci)?;
        self.play_move(from, to, promotion)
    }

    fn last_played(&self) -> Option<&MoveRecord> {
        match self.state.cursor() {
            Cursor::Branch { branch, .. } => branch.moves().last(),
            Cursor::MainLine { .. } => self.state.line().moves().last(),
        }
    }

    /// The position on the board right now.
    pub fn displayed_position(&self) -> Chess {
        match self.state.cursor() {
            Cursor::Branch { branch, .. } => branch.position().clone(),
            Cursor::MainLine { index } => compute_position(self.state.line(), *index).position,
        }
    }

    pub fn displayed_fen(&self) -> String {
        rules::fen(&self.displayed_position())
    }

    pub fn can_go_back(&self) -> bool {
        self.state.index() > -1
    }

    pub fn can_go_forward(&self) -> bool {
        self.state.index() < self.state.line().tip()
    }

    /// Moves leading to the displayed position: the main line through the
    /// cursor, or through the divergence point followed by the branch.
    pub fn moves_to_cursor(&self) -> Vec<&MoveRecord> {
        let line = self.state.line().moves();
        match self.state.cursor() {
            Cursor::Branch { branch, .. } => {
                let upto = (branch.base() + 1) as usize;
                line[..upto].iter().chain(branch.moves()).collect()
            }
            Cursor::MainLine { index } => line[..(*index + 1) as usize].iter().collect(),
        }
    }

    pub fn move_list(&self) -> MoveList {
        display::move_list(&self.state)
    }

    pub fn status(&self) -> String {
        let path: Vec<MoveRecord> = self.moves_to_cursor().into_iter().cloned().collect();
        display::describe_cursor(self.state.line().start(), &path, self.state.index())
    }
}
