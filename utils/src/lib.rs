mod board;
mod moves;

pub use board::{game_status, has_insufficient_material, GameStatus, STARTING_FEN};
pub use moves::{move_to_uci, resolve_move, NotationError};
