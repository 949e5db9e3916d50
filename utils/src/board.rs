use chess::{BitBoard, Board, BoardStatus, Color, Piece, EMPTY};
use serde::Serialize;

/// FEN of the standard starting position, as printed by `Board::default()`.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const LIGHT_SQUARES_MASK: u64 = 0x55AA55AA55AA55AA;

/// Where a game stands after the last half-move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
}

impl GameStatus {
    #[inline]
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }
}

pub fn game_status(board: &Board) -> GameStatus {
    match board.status() {
        BoardStatus::Checkmate => GameStatus::Checkmate,
        BoardStatus::Stalemate => GameStatus::Stalemate,
        BoardStatus::Ongoing if has_insufficient_material(board) => {
            GameStatus::InsufficientMaterial
        }
        BoardStatus::Ongoing => GameStatus::Ongoing,
    }
}

/// Checks if the position has insufficient material for either side to force checkmate:
/// - K vs K
/// - K+N vs K (either side)
/// - K+B vs K (either side)
/// - K+B vs K+B with same-colored bishops
pub fn has_insufficient_material(board: &Board) -> bool {
    let pawns = board.pieces(Piece::Pawn);
    let rooks = board.pieces(Piece::Rook);
    let queens = board.pieces(Piece::Queen);

    if (pawns | rooks | queens) != EMPTY {
        return false;
    }

    let white = board.color_combined(Color::White);
    let black = board.color_combined(Color::Black);
    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);

    let white_knights = (white & knights).popcnt();
    let black_knights = (black & knights).popcnt();
    let white_bishops = (white & bishops).popcnt();
    let black_bishops = (black & bishops).popcnt();

    let white_minors = white_knights + white_bishops;
    let black_minors = black_knights + black_bishops;

    match (white_minors, black_minors) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) if white_bishops == 1 && black_bishops == 1 => {
            let light_squares = BitBoard(LIGHT_SQUARES_MASK);
            let white_on_light = (white & bishops & light_squares) != EMPTY;
            let black_on_light = (black & bishops & light_squares) != EMPTY;

            white_on_light == black_on_light
        }
        _ => false,
    }
}
