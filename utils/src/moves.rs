use std::str::FromStr;

use chess::{Board, ChessMove, MoveGen, Piece, Square};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("move code {0:?} must be 4 or 5 ASCII characters")]
    BadLength(String),

    #[error("move code {0:?} contains an invalid square")]
    BadSquare(String),

    #[error("move code {0:?} has an invalid promotion piece")]
    BadPromotion(String),

    #[error("move code {0:?} reaches the last rank and needs a promotion piece")]
    PromotionRequired(String),

    #[error("move code {0:?} is not legal in this position")]
    Illegal(String),
}

/// The decoded form of a move code, before it is checked against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MoveCode {
    from: Square,
    to: Square,
    promotion: Option<Piece>,
}

fn parse_code(code: &str) -> Result<MoveCode, NotationError> {
    // Length is checked in bytes, so non-ASCII input must be rejected before slicing
    if !code.is_ascii() || !(4..=5).contains(&code.len()) {
        return Err(NotationError::BadLength(code.to_string()));
    }

    let from = Square::from_str(&code[0..2])
        .map_err(|_| NotationError::BadSquare(code.to_string()))?;
    let to = Square::from_str(&code[2..4])
        .map_err(|_| NotationError::BadSquare(code.to_string()))?;

    let promotion = match code.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(Piece::Queen),
        Some(b'r') => Some(Piece::Rook),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'n') => Some(Piece::Knight),
        Some(_) => return Err(NotationError::BadPromotion(code.to_string())),
    };

    Ok(MoveCode {
        from,
        to,
        promotion,
    })
}

/// Resolves a UCI move code (`e2e4`, `e7e8q`) to the legal move it names in `board`.
///
/// The legal move list is the only source of truth: a code is accepted only if a
/// generated legal move has the same origin, destination and promotion piece.
/// A four-character code that lands a pawn on the last rank is ambiguous
/// between four promotions and is rejected rather than guessed.
pub fn resolve_move(board: &Board, code: &str) -> Result<ChessMove, NotationError> {
    let parsed = parse_code(code)?;

    let mut needs_promotion = false;

    for mv in MoveGen::new_legal(board) {
        if mv.get_source() != parsed.from || mv.get_dest() != parsed.to {
            continue;
        }

        match (mv.get_promotion(), parsed.promotion) {
            (None, None) => return Ok(mv),
            (Some(piece), Some(wanted)) if piece == wanted => return Ok(mv),
            (Some(_), None) => needs_promotion = true,
            _ => {}
        }
    }

    if needs_promotion {
        Err(NotationError::PromotionRequired(code.to_string()))
    } else {
        Err(NotationError::Illegal(code.to_string()))
    }
}

/// Renders a move in UCI long algebraic notation.
#[inline]
pub fn move_to_uci(mv: ChessMove) -> String {
    mv.to_string()
}
