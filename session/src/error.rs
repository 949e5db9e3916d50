use engine::EngineError;
use serde::Serialize;
use thiserror::Error;
use utils::NotationError;

use crate::game::GameId;
use crate::store::StoreError;

/// Everything a request against a game can fail with.
///
/// `Display` is the user-facing message. Sources carry the internal detail
/// and are only meant for logs.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("no active game {0}")]
    SessionNotFound(GameId),

    #[error("invalid move: {0}")]
    InvalidMove(#[source] NotationError),

    #[error("the engine could not produce a move")]
    EngineFailure(#[source] EngineError),

    #[error("the engine proposed a move that could not be played")]
    EngineMoveRejected {
        code: String,
        #[source]
        source: NotationError,
    },

    #[error("the game could not be saved")]
    PersistenceFailure(#[source] StoreError),

    #[error("the move was played but could not be saved")]
    PersistenceDiverged(#[source] StoreError),
}

impl PlayError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PlayError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            PlayError::InvalidMove(_) => "INVALID_MOVE",
            PlayError::EngineFailure(_) => "ENGINE_FAILURE",
            PlayError::EngineMoveRejected { .. } => "ENGINE_MOVE_REJECTED",
            PlayError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            PlayError::PersistenceDiverged(_) => "PERSISTENCE_DIVERGED",
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub code: &'static str,
    pub message: String,
}
