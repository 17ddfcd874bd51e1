//! Game model for the viewer: recorded moves, position reconstruction,
//! temporary branches, navigation and move-list formatting.

pub mod branch;
pub mod display;
pub mod error;
pub mod game_data;
pub mod line;
pub mod moves;
pub mod navigation;
pub mod pgn;
pub mod position;
pub mod rules;

pub use branch::{Branch, Cursor, GameState};
pub use error::{NavError, PgnError, RulesError};
pub use game_data::GameMetadata;
pub use line::MainLine;
pub use moves::{MoveFlags, MoveRecord};
pub use navigation::{Intent, Navigator};
pub use position::{compute_position, Replay};
