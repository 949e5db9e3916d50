use std::sync::Arc;
use std::time::Duration;

use chess::Board;
use engine::Engine;
use log::{debug, error, info, warn};
use serde::Serialize;
use uci::Score;
use utils::{resolve_move, GameStatus, STARTING_FEN};

use crate::config::PlayConfig;
use crate::error::PlayError;
use crate::game::{GameId, GameSession, SessionGuard};
use crate::registry::Registry;
use crate::store::{GameStore, MoveRecord, ANONYMOUS};

#[derive(Debug, Clone, Serialize)]
pub struct GameStarted {
    pub game_id: GameId,
    pub position: String,
}

/// Result of one player move and the engine's answer.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub game_id: GameId,
    pub player_move: String,
    /// `None` when the engine had no move, i.e. the player's move ended the game.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_move: Option<String>,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Score>,
    pub status: GameStatus,
    pub game_over: bool,
}

/// The engine's view of a position, without playing anything.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub game_id: GameId,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_move: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Score>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub game_id: GameId,
    pub position: String,
    pub status: GameStatus,
    pub moves: Vec<String>,
}

/// Runs requests against game sessions.
///
/// A move request holds its session's lock from the player's move until the
/// result is stored, so two requests on the same game are applied one after
/// the other. Requests on different games only share the registry lock,
/// and only for lookups.
pub struct Orchestrator<E, S> {
    registry: Registry,
    engine: E,
    store: S,
    config: PlayConfig,
}

impl<E: Engine, S: GameStore> Orchestrator<E, S> {
    pub fn new(registry: Registry, engine: E, store: S, config: PlayConfig) -> Self {
        Self {
            registry,
            engine,
            store,
            config,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Opens a new game owned by `owner`.
    pub fn start_game(&self, owner: &str) -> Result<GameStarted, PlayError> {
        let session = self.open_game(Some(owner))?;
        let game = session.lock();

        Ok(GameStarted {
            game_id: game.id(),
            position: game.fen(),
        })
    }

    /// Plays `code` for `owner` in one of their games and answers with the engine.
    pub fn make_move(
        &self,
        owner: &str,
        game_id: GameId,
        code: &str,
    ) -> Result<MoveOutcome, PlayError> {
        let session = self.find(Some(owner), game_id)?;
        self.play(&session, owner, code, self.config.move_time)
    }

    /// Plays `code` in an anonymous game, starting one when `game_id` is absent
    /// or does not name a live anonymous game.
    ///
    /// The engine's reply is played as well, the same as in [`Self::make_move`].
    /// Use [`Self::analyze`] for a best-move hint that leaves the game alone.
    pub fn solo_move(&self, game_id: Option<GameId>, code: &str) -> Result<MoveOutcome, PlayError> {
        let session = match game_id.and_then(|id| self.find(None, id).ok()) {
            Some(session) => session,
            None => {
                // A game is only opened for a move that can be played in it
                resolve_move(&Board::default(), code).map_err(|e| {
                    debug!("Rejected opening solo move {:?}: {}", code, e);
                    PlayError::InvalidMove(e)
                })?;
                self.open_game(None)?
            }
        };

        self.play(&session, ANONYMOUS, code, self.config.solo_move_time)
    }

    /// Asks the engine for the best move in the current position.
    pub fn analyze(&self, caller: Option<&str>, game_id: GameId) -> Result<Analysis, PlayError> {
        let session = self.find(caller, game_id)?;
        let game = session.lock();
        let position = game.fen();

        let reply = self
            .engine
            .best_reply(&position, self.config.analysis_move_time)
            .map_err(PlayError::EngineFailure)?;

        Ok(Analysis {
            game_id,
            position,
            best_move: reply.best_move,
            evaluation: reply.score,
        })
    }

    pub fn snapshot(&self, caller: Option<&str>, game_id: GameId) -> Result<GameSnapshot, PlayError> {
        let session = self.find(caller, game_id)?;
        let game = session.lock();

        Ok(GameSnapshot {
            game_id,
            position: game.fen(),
            status: game.status(),
            moves: game.moves(),
        })
    }

    /// Drops a live game. Its stored record is left as it is.
    pub fn end_game(&self, caller: Option<&str>, game_id: GameId) -> Result<(), PlayError> {
        self.find(caller, game_id)?;
        self.registry.remove(game_id);
        info!("Ended game {}", game_id);
        Ok(())
    }

    fn open_game(&self, owner: Option<&str>) -> Result<Arc<GameSession>, PlayError> {
        let game_id = self
            .store
            .create_game(owner.unwrap_or(ANONYMOUS), STARTING_FEN)
            .map_err(PlayError::PersistenceFailure)?;

        info!("Started game {} for {}", game_id, owner.unwrap_or(ANONYMOUS));
        Ok(self.registry.create(game_id, owner.map(str::to_string)))
    }

    fn find(&self, caller: Option<&str>, game_id: GameId) -> Result<Arc<GameSession>, PlayError> {
        self.registry
            .get(game_id)
            .filter(|session| session.accessible_by(caller))
            .ok_or(PlayError::SessionNotFound(game_id))
    }

    fn play(
        &self,
        session: &GameSession,
        player: &str,
        code: &str,
        think_time: Duration,
    ) -> Result<MoveOutcome, PlayError> {
        let mut game = session.lock();
        let game_id = game.id();
        let checkpoint = game.checkpoint();

        let position = game.apply_player_move(code).inspect_err(|e| {
            debug!("Game {}: rejected player move {:?}: {}", game_id, code, e);
        })?;

        let reply = match self.engine.best_reply(&position, think_time) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Game {}: engine failed: {}", game_id, e);
                game.restore(checkpoint);
                return Err(PlayError::EngineFailure(e));
            }
        };

        let Some(engine_move) = reply.best_move else {
            info!("Game {}: engine has no move after {}", game_id, code);
            self.persist(&game, player, code, "")?;
            return Ok(MoveOutcome {
                game_id,
                player_move: code.to_string(),
                engine_move: None,
                position,
                evaluation: reply.score,
                status: game.status(),
                game_over: true,
            });
        };

        if let Err(e) = game.apply_engine_move(&engine_move) {
            error!(
                "Game {}: engine move {:?} rejected in {}: {:?}",
                game_id, engine_move, position, e
            );
            game.restore(checkpoint);
            return Err(e);
        }

        self.persist(&game, player, code, &engine_move)?;

        let status = game.status();
        Ok(MoveOutcome {
            game_id,
            player_move: code.to_string(),
            engine_move: Some(engine_move),
            position: game.fen(),
            evaluation: reply.score,
            status,
            game_over: status.is_over(),
        })
    }

    /// Writes the move pair and the new position. The session has already
    /// advanced, so a failure here leaves the store behind the live game.
    fn persist(
        &self,
        game: &SessionGuard<'_>,
        player: &str,
        player_move: &str,
        engine_move: &str,
    ) -> Result<(), PlayError> {
        let fen = game.fen();
        let record = MoveRecord {
            player: player.to_string(),
            player_move: player_move.to_string(),
            engine_move: engine_move.to_string(),
            fen: fen.clone(),
        };

        self.store
            .record_move(game.id(), &record)
            .and_then(|()| self.store.update_game_position(game.id(), &fen))
            .map_err(|e| {
                error!("Game {}: live state is ahead of the store: {}", game.id(), e);
                PlayError::PersistenceDiverged(e)
            })
    }
}
