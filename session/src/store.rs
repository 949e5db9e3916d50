use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use crate::game::GameId;

/// Player name recorded for anonymous solo games.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game {0} does not exist")]
    UnknownGame(GameId),

    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// One player move and the engine's answer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub player: String,
    pub player_move: String,
    /// Empty when the engine had no move to answer with.
    pub engine_move: String,
    /// Position after both half-moves.
    pub fen: String,
}

/// Durable record of games and moves.
///
/// Written after each applied move; never read while a move is in flight.
pub trait GameStore: Send + Sync {
    fn create_game(&self, owner: &str, fen: &str) -> Result<GameId, StoreError>;

    fn record_move(&self, game_id: GameId, record: &MoveRecord) -> Result<(), StoreError>;

    fn update_game_position(&self, game_id: GameId, fen: &str) -> Result<(), StoreError>;
}

impl<S: GameStore + ?Sized> GameStore for Arc<S> {
    fn create_game(&self, owner: &str, fen: &str) -> Result<GameId, StoreError> {
        (**self).create_game(owner, fen)
    }

    fn record_move(&self, game_id: GameId, record: &MoveRecord) -> Result<(), StoreError> {
        (**self).record_move(game_id, record)
    }

    fn update_game_position(&self, game_id: GameId, fen: &str) -> Result<(), StoreError> {
        (**self).update_game_position(game_id, fen)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredGame {
    pub owner: String,
    pub fen: String,
    pub moves: Vec<MoveRecord>,
}

/// A [`GameStore`] kept in process memory.
pub struct MemoryStore {
    next_id: AtomicU64,
    games: Mutex<AHashMap<GameId, StoredGame>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            games: Mutex::new(AHashMap::new()),
        }
    }

    pub fn game(&self, game_id: GameId) -> Option<StoredGame> {
        self.games.lock().get(&game_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.games.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameStore for MemoryStore {
    fn create_game(&self, owner: &str, fen: &str) -> Result<GameId, StoreError> {
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.games.lock().insert(
            id,
            StoredGame {
                owner: owner.to_string(),
                fen: fen.to_string(),
                moves: Vec::new(),
            },
        );
        Ok(id)
    }

    fn record_move(&self, game_id: GameId, record: &MoveRecord) -> Result<(), StoreError> {
        let mut games = self.games.lock();
        let game = games
            .get_mut(&game_id)
            .ok_or(StoreError::UnknownGame(game_id))?;
        game.moves.push(record.clone());
        Ok(())
    }

    fn update_game_position(&self, game_id: GameId, fen: &str) -> Result<(), StoreError> {
        let mut games = self.games.lock();
        let game = games
            .get_mut(&game_id)
            .ok_or(StoreError::UnknownGame(game_id))?;
        game.fen = fen.to_string();
        Ok(())
    }
}
