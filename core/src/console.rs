//! Line-oriented front end: one command per input line, one JSON object per output line.

use std::io::{self, BufRead, Write};

use engine::Engine;
use log::debug;
use serde::Serialize;
use serde_json::json;
use session::{ErrorPayload, GameId, GameStore, Orchestrator, PlayError};

const HELP: &[&str] = &[
    "new            start a game against the engine",
    "move <code>    play a move in the current game, e.g. move e2e4",
    "solo <code>    play a move in an anonymous game",
    "analyze        ask the engine for the best move in the current game",
    "show           print the current game",
    "end            drop the current game",
    "quit           exit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    New,
    Move(String),
    Solo(String),
    Analyze,
    Show,
    End,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn decode(line: &str) -> ConsoleInput {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return ConsoleInput::Empty;
    };
    let argument = parts.next();

    if parts.next().is_some() {
        return ConsoleInput::Unknown(line.trim().to_string());
    }

    match (command, argument) {
        ("new", None) => ConsoleInput::New,
        ("move", Some(code)) => ConsoleInput::Move(code.to_string()),
        ("solo", Some(code)) => ConsoleInput::Solo(code.to_string()),
        ("analyze", None) => ConsoleInput::Analyze,
        ("show", None) => ConsoleInput::Show,
        ("end", None) => ConsoleInput::End,
        ("help", None) => ConsoleInput::Help,
        ("quit", None) => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(line.trim().to_string()),
    }
}

pub struct Console<E, S> {
    orchestrator: Orchestrator<E, S>,
    owner: String,
    current: Option<GameId>,
}

impl<E: Engine, S: GameStore> Console<E, S> {
    pub fn new(orchestrator: Orchestrator<E, S>, owner: String) -> Self {
        Self {
            orchestrator,
            owner,
            current: None,
        }
    }

    /// Reads commands from stdin until `quit` or end of input.
    pub fn run(mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout().lock();

        for line in stdin.lock().lines() {
            let line = line?;
            debug!("Input: {:?}", line.trim());

            if !self.handle(decode(&line), &mut stdout)? {
                break;
            }
        }

        Ok(())
    }

    /// Handles one command. Returns false when the console should exit.
    pub fn handle(&mut self, input: ConsoleInput, out: &mut impl Write) -> io::Result<bool> {
        match input {
            ConsoleInput::New => {
                let result = self.orchestrator.start_game(&self.owner);
                if let Ok(started) = &result {
                    self.current = Some(started.game_id);
                }
                respond(out, result)?;
            }
            ConsoleInput::Move(code) => match self.current {
                Some(game_id) => {
                    let result = self.orchestrator.make_move(&self.owner, game_id, &code);
                    respond(out, result)?;
                }
                None => no_game(out)?,
            },
            ConsoleInput::Solo(code) => {
                let result = self.orchestrator.solo_move(self.current, &code);
                if let Ok(outcome) = &result {
                    self.current = Some(outcome.game_id);
                }
                respond(out, result)?;
            }
            ConsoleInput::Analyze => match self.current {
                Some(game_id) => {
                    let result = self.orchestrator.analyze(Some(&self.owner), game_id);
                    respond(out, result)?;
                }
                None => no_game(out)?,
            },
            ConsoleInput::Show => match self.current {
                Some(game_id) => {
                    let result = self.orchestrator.snapshot(Some(&self.owner), game_id);
                    respond(out, result)?;
                }
                None => no_game(out)?,
            },
            ConsoleInput::End => match self.current.take() {
                Some(game_id) => {
                    let result = self
                        .orchestrator
                        .end_game(Some(&self.owner), game_id)
                        .map(|()| json!({ "ended": game_id }));
                    respond(out, result)?;
                }
                None => no_game(out)?,
            },
            ConsoleInput::Help => write_line(out, &json!({ "commands": HELP }))?,
            ConsoleInput::Quit => return Ok(false),
            ConsoleInput::Empty => {}
            ConsoleInput::Unknown(line) => {
                debug!("Unknown command: {}", line);
                write_line(
                    out,
                    &ErrorPayload {
                        code: "UNKNOWN_COMMAND",
                        message: "unknown command, type help for a list".to_string(),
                    },
                )?;
            }
        }

        Ok(true)
    }
}

fn respond(out: &mut impl Write, result: Result<impl Serialize, PlayError>) -> io::Result<()> {
    match result {
        Ok(value) => write_line(out, &value),
        Err(e) => write_line(out, &e.payload()),
    }
}

fn no_game(out: &mut impl Write) -> io::Result<()> {
    write_line(
        out,
        &ErrorPayload {
            code: "NO_CURRENT_GAME",
            message: "start a game with new or solo first".to_string(),
        },
    )
}

fn write_line(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use engine::{EngineError, Reply};
    use serde_json::Value;
    use session::{MemoryStore, PlayConfig, Registry};
    use uci::Score;

    struct AlwaysE7E5;

    impl Engine for AlwaysE7E5 {
        fn best_reply(&self, _fen: &str, _think_time: Duration) -> Result<Reply, EngineError> {
            Ok(Reply {
                best_move: Some("e7e5".to_string()),
                score: Some(Score::Centipawns(20)),
            })
        }
    }

    fn console() -> Console<AlwaysE7E5, MemoryStore> {
        let orchestrator = Orchestrator::new(
            Registry::default(),
            AlwaysE7E5,
            MemoryStore::new(),
            PlayConfig::default(),
        );
        Console::new(orchestrator, "player".to_string())
    }

    fn run(console: &mut Console<AlwaysE7E5, MemoryStore>, line: &str) -> Value {
        let mut out = Vec::new();
        assert!(console.handle(decode(line), &mut out).unwrap());
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("new"), ConsoleInput::New);
        assert_eq!(decode("  move e2e4 "), ConsoleInput::Move("e2e4".to_string()));
        assert_eq!(decode("solo e7e8q"), ConsoleInput::Solo("e7e8q".to_string()));
        assert_eq!(decode("quit"), ConsoleInput::Quit);
        assert_eq!(decode(""), ConsoleInput::Empty);
        assert_eq!(decode("move"), ConsoleInput::Unknown("move".to_string()));
        assert_eq!(
            decode("move e2e4 e7e5"),
            ConsoleInput::Unknown("move e2e4 e7e5".to_string())
        );
        assert_eq!(decode("new game"), ConsoleInput::Unknown("new game".to_string()));
    }

    #[test]
    fn test_game_flow() {
        let mut console = console();

        let started = run(&mut console, "new");
        assert_eq!(
            started["position"],
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );

        let outcome = run(&mut console, "move e2e4");
        assert_eq!(outcome["engine_move"], "e7e5");
        assert_eq!(outcome["evaluation"]["kind"], "cp");
        assert_eq!(outcome["evaluation"]["value"], 20);
        assert_eq!(outcome["game_over"], false);

        let shown = run(&mut console, "show");
        assert_eq!(shown["moves"], json!(["e2e4", "e7e5"]));

        let ended = run(&mut console, "end");
        assert_eq!(ended["ended"], started["game_id"]);
    }

    #[test]
    fn test_errors_are_payloads() {
        let mut console = console();

        let missing = run(&mut console, "move e2e4");
        assert_eq!(missing["code"], "NO_CURRENT_GAME");

        run(&mut console, "new");
        let invalid = run(&mut console, "move e2e9");
        assert_eq!(invalid["code"], "INVALID_MOVE");

        let unknown = run(&mut console, "castle");
        assert_eq!(unknown["code"], "UNKNOWN_COMMAND");
    }

    #[test]
    fn test_solo_continues_same_game() {
        let mut console = console();

        let first = run(&mut console, "solo e2e4");
        let second = run(&mut console, "solo d2d4");
        assert_eq!(first["game_id"], second["game_id"]);
    }

    #[test]
    fn test_quit_stops() {
        let mut console = console();
        let mut out = Vec::new();
        assert!(!console.handle(ConsoleInput::Quit, &mut out).unwrap());
        assert!(out.is_empty());
    }
}
