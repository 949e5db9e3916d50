use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "Sparring")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Play chess against a UCI engine from the terminal")]
pub struct Args {
    /// UCI engine executable, e.g. a Stockfish binary.
    #[arg(long, env = "STOCKFISH_PATH")]
    pub engine: PathBuf,

    /// Extra argument passed to the engine. Repeat for more.
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Think time for moves in owned games, in milliseconds.
    #[arg(long, env = "SPARRING_MOVE_TIME", default_value_t = 500)]
    pub move_time: u64,

    /// Think time for solo moves, in milliseconds.
    #[arg(long, env = "SPARRING_SOLO_MOVE_TIME", default_value_t = 2000)]
    pub solo_move_time: u64,

    /// Think time for `analyze`, in milliseconds.
    #[arg(long, env = "SPARRING_ANALYSIS_MOVE_TIME", default_value_t = 2000)]
    pub analysis_move_time: u64,

    /// Grace period past the think time before a silent engine counts as hung, in milliseconds.
    #[arg(long, env = "SPARRING_RESPONSE_MARGIN", default_value_t = 5000)]
    pub response_margin: u64,

    /// Maximum number of games kept in memory.
    #[arg(long, env = "SPARRING_MAX_SESSIONS", default_value_t = 1024)]
    pub max_sessions: usize,

    /// Seconds of inactivity after which a game is dropped.
    #[arg(long, env = "SPARRING_IDLE_TIMEOUT", default_value_t = 3600)]
    pub idle_timeout: u64,

    /// Player name recorded for games started with `new`.
    #[arg(long, env = "SPARRING_OWNER", default_value = "player")]
    pub owner: String,

    /// Log to a file at debug level, including all engine traffic.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Level for logs written to stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    pub fn move_time(&self) -> Duration {
        Duration::from_millis(self.move_time)
    }

    pub fn solo_move_time(&self) -> Duration {
        Duration::from_millis(self.solo_move_time)
    }

    pub fn analysis_move_time(&self) -> Duration {
        Duration::from_millis(self.analysis_move_time)
    }

    pub fn response_margin(&self) -> Duration {
        Duration::from_millis(self.response_margin)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
