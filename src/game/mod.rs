//! Core connect-N game logic: board representation, player types, and game
//! state machine with immutable transitions.

mod board;
mod player;
mod state;

pub use board::{Board, Cell};
pub use player::Player;
pub use state::{GameConfig, GameOutcome, GameState, MoveError};
