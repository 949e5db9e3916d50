mod decoder;
mod encoder;

pub mod commands;

pub use commands::{GoParams, Score, UciCommand, UciOutput};
pub use decoder::Decoder;
pub use encoder::Encoder;

/// Null move in UCI format, sent as the bestmove when no legal move exists.
pub const NULL_MOVE: &str = "0000";

/// What Stockfish prints instead of a move when the side to move is mated or stalemated.
pub const NO_MOVE: &str = "(none)";

/// Whether a bestmove token means "there is no move".
#[inline]
pub fn is_null_move(token: &str) -> bool {
    token == NULL_MOVE || token == NO_MOVE
}
