//! Game sessions against an external engine.
//!
//! A [`Registry`] maps game ids to live [`GameSession`]s. The [`Orchestrator`]
//! runs one request at a time per session: it locks the session, applies the
//! player's move, asks the engine for a reply, applies that, and hands the
//! result to the [`GameStore`].

mod config;
mod error;
mod game;
mod orchestrator;
mod registry;
mod store;

pub use config::{PlayConfig, RegistryConfig};
pub use error::{ErrorPayload, PlayError};
pub use game::{GameId, GameSession, SessionGuard};
pub use orchestrator::{Analysis, GameSnapshot, GameStarted, MoveOutcome, Orchestrator};
pub use registry::Registry;
pub use store::{GameStore, MemoryStore, MoveRecord, StoreError, StoredGame, ANONYMOUS};
