use uci::{Decoder, Score, UciOutput};

/// What an engine answered for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// `None` when the engine reported that the side to move has no move.
    pub best_move: Option<String>,
    /// The last evaluation seen before `bestmove`.
    pub score: Option<Score>,
}

impl Reply {
    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.best_move.is_none()
    }
}

/// Folds engine output lines into a [`Reply`].
///
/// Later search depths revise the evaluation, so every `score` overwrites the
/// previous one. The first `bestmove` line completes the reply.
#[derive(Default)]
pub struct ReplyCollector {
    decoder: Decoder,
    score: Option<Score>,
}

impl ReplyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, line: &str) -> Option<Reply> {
        match self.decoder.decode(line) {
            UciOutput::BestMove { best_move, .. } => Some(Reply {
                best_move,
                score: self.score,
            }),
            UciOutput::Score(score) => {
                self.score = Some(score);
                None
            }
            _ => None,
        }
    }
}
