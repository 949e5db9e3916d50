use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chess::{Action, Board, Game};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use utils::{game_status, move_to_uci, resolve_move, GameStatus, NotationError};

use crate::error::PlayError;

/// Durable identifier of a game, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(GameId)
    }
}

/// One game in progress.
///
/// The rules state is only reachable through [`GameSession::lock`], so every
/// move is applied while holding the session's lock.
pub struct GameSession {
    id: GameId,
    owner: Option<String>,
    game: Mutex<Game>,
}

impl GameSession {
    pub fn new(id: GameId, owner: Option<String>) -> Self {
        Self {
            id,
            owner,
            game: Mutex::new(Game::new()),
        }
    }

    #[inline]
    pub fn id(&self) -> GameId {
        self.id
    }

    /// The identity that started the game, `None` for anonymous solo games.
    #[inline]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Owned games are only visible to their owner. Anonymous games are
    /// visible to anyone holding the id.
    pub fn accessible_by(&self, caller: Option<&str>) -> bool {
        match self.owner() {
            None => true,
            Some(owner) => caller == Some(owner),
        }
    }

    pub fn lock(&self) -> SessionGuard<'_> {
        SessionGuard {
            id: self.id,
            game: self.game.lock(),
        }
    }
}

/// Exclusive access to a session's game for the duration of one request.
pub struct SessionGuard<'a> {
    id: GameId,
    game: MutexGuard<'a, Game>,
}

impl SessionGuard<'_> {
    #[inline]
    pub fn id(&self) -> GameId {
        self.id
    }

    #[inline]
    pub fn board(&self) -> Board {
        self.game.current_position()
    }

    /// The current position in FEN.
    pub fn fen(&self) -> String {
        self.board().to_string()
    }

    pub fn status(&self) -> GameStatus {
        game_status(&self.board())
    }

    /// Every half-move played so far, in UCI notation.
    pub fn moves(&self) -> Vec<String> {
        self.game
            .actions()
            .iter()
            .filter_map(|action| match action {
                Action::MakeMove(mv) => Some(move_to_uci(*mv)),
                _ => None,
            })
            .collect()
    }

    pub fn apply_player_move(&mut self, code: &str) -> Result<String, PlayError> {
        self.apply(code).map_err(PlayError::InvalidMove)?;
        Ok(self.fen())
    }

    /// Same as [`Self::apply_player_move`], but a failure means the engine and
    /// the rules library disagree, not that a user made a mistake.
    pub fn apply_engine_move(&mut self, code: &str) -> Result<String, PlayError> {
        self.apply(code)
            .map_err(|source| PlayError::EngineMoveRejected {
                code: code.to_string(),
                source,
            })?;
        Ok(self.fen())
    }

    fn apply(&mut self, code: &str) -> Result<(), NotationError> {
        let mv = resolve_move(&self.board(), code)?;

        // The game re-checks legality, and refuses moves once it has a result
        if !self.game.make_move(mv) {
            return Err(NotationError::Illegal(code.to_string()));
        }

        Ok(())
    }

    /// A copy of the game to roll back to with [`Self::restore`].
    pub(crate) fn checkpoint(&self) -> Game {
        self.game.clone()
    }

    pub(crate) fn restore(&mut self, checkpoint: Game) {
        *self.game = checkpoint;
    }
}
