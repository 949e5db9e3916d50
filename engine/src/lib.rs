//! Talks to an external UCI engine over its stdin/stdout.
//!
//! Every request spawns a fresh engine process, sends `uci`, `position fen`
//! and `go movetime`, then reads until `bestmove` or until the deadline
//! passes. The process is killed when the request finishes, whatever the
//! outcome.

mod config;
mod error;
mod process;
mod reply;
mod uci_engine;

use std::sync::Arc;
use std::time::Duration;

pub use config::EngineConfig;
pub use error::EngineError;
pub use process::EngineProcess;
pub use reply::{Reply, ReplyCollector};
pub use uci_engine::UciEngine;

/// Something that can propose a move for a position.
pub trait Engine: Send + Sync {
    /// Searches `fen` for `think_time` and returns the engine's choice.
    fn best_reply(&self, fen: &str, think_time: Duration) -> Result<Reply, EngineError>;
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn best_reply(&self, fen: &str, think_time: Duration) -> Result<Reply, EngineError> {
        (**self).best_reply(fen, think_time)
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn best_reply(&self, fen: &str, think_time: Duration) -> Result<Reply, EngineError> {
        (**self).best_reply(fen, think_time)
    }
}
