use std::fmt;

use serde::Serialize;

/// Commands written to an engine's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position { fen: String },
    Go(GoParams),
    Stop,
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    // Search exactly movetime milliseconds.
    pub move_time: Option<u64>,

    // Search depth ply only.
    pub depth: Option<u8>,

    // Search until a stop command is received.
    pub infinite: bool,
}

impl GoParams {
    pub fn move_time(millis: u64) -> Self {
        Self {
            move_time: Some(millis),
            ..Default::default()
        }
    }
}

/// A single line read from an engine's stdout, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOutput {
    /// `bestmove <move> [ponder <move>]`. `best_move` is `None` when the
    /// engine reports that the side to move has no legal move.
    BestMove {
        best_move: Option<String>,
        ponder: Option<String>,
    },
    /// Any other line that carries a `score cp|mate <n>` triple.
    Score(Score),
    UciOk,
    ReadyOk,
    Other(String),
}

/// Engine evaluation from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Score {
    #[serde(rename = "cp")]
    Centipawns(i32),
    // Positive for mate-in-n, negative for mated-in-n
    #[serde(rename = "mate")]
    Mate(i32),
}

impl Score {
    /// The raw number the engine printed after `cp` or `mate`.
    pub fn value(&self) -> i32 {
        match self {
            Score::Centipawns(cp) => *cp,
            Score::Mate(moves) => *moves,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "cp {}", cp),
            Score::Mate(moves) => write!(f, "mate {}", moves),
        }
    }
}
