use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine executable.
    pub path: PathBuf,
    /// Extra command line arguments passed to the engine.
    pub args: Vec<String>,
    /// How long past the requested think time a silent engine is tolerated.
    pub response_margin: Duration,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            response_margin: Duration::from_secs(5),
        }
    }
}
