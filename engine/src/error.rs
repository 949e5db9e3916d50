use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine {}: {source}", path.display())]
    Spawn { path: PathBuf, source: io::Error },

    #[error("could not open the engine's stdin/stdout pipes")]
    Pipe,

    #[error("failed to write to engine: {0}")]
    Write(#[from] io::Error),

    #[error("engine closed its output before sending bestmove")]
    Closed,

    #[error("engine did not send bestmove before the deadline")]
    Timeout,
}
