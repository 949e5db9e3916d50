use std::time::{Duration, Instant};

use log::{debug, warn};
use uci::{GoParams, UciCommand};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::process::EngineProcess;
use crate::reply::{Reply, ReplyCollector};
use crate::Engine;

/// Upper bound on how long one search may wait for `bestmove`, whatever the
/// configured think time and margin add up to.
const MAX_WAIT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Spawns a fresh engine process for every search.
///
/// A new process per request cannot inherit half-read output from an earlier
/// search, at the price of process start-up latency on each move.
pub struct UciEngine {
    config: EngineConfig,
}

impl UciEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn search(
        &self,
        process: &mut EngineProcess,
        fen: &str,
        think_time: Duration,
    ) -> Result<Reply, EngineError> {
        let move_time = u64::try_from(think_time.as_millis()).unwrap_or(u64::MAX);

        process.send(&UciCommand::Uci)?;
        process.send(&UciCommand::Position {
            fen: fen.to_string(),
        })?;
        process.send(&UciCommand::Go(GoParams::move_time(move_time)))?;

        let deadline = search_deadline(Instant::now(), think_time, self.config.response_margin);
        let mut collector = ReplyCollector::new();

        loop {
            let line = process.recv_line(deadline)?;
            if let Some(reply) = collector.feed(&line) {
                return Ok(reply);
            }
        }
    }
}

fn search_deadline(now: Instant, think_time: Duration, margin: Duration) -> Instant {
    let wait = think_time.saturating_add(margin).min(MAX_WAIT);
    now.checked_add(wait).unwrap_or(now)
}

impl Engine for UciEngine {
    fn best_reply(&self, fen: &str, think_time: Duration) -> Result<Reply, EngineError> {
        let mut process = EngineProcess::spawn(&self.config)?;
        let pid = process.id();

        let result = self.search(&mut process, fen, think_time);

        // Killed here on every path, before the result is handed back
        drop(process);

        match &result {
            Ok(reply) => debug!(
                "[engine {}] bestmove {:?} score {:?}",
                pid, reply.best_move, reply.score
            ),
            Err(EngineError::Timeout) => warn!(
                "[engine {}] no bestmove within {:?} (+{:?} margin)",
                pid, think_time, self.config.response_margin
            ),
            Err(e) => warn!("[engine {}] search failed: {}", pid, e),
        }

        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use uci::Score;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    /// Runs `script` under `sh` as a stand-in for a UCI engine.
    fn fake_engine(script: &str) -> UciEngine {
        UciEngine::new(EngineConfig {
            path: "sh".into(),
            args: vec!["-c".to_string(), script.to_string()],
            response_margin: Duration::from_millis(2000),
        })
    }

    const RESPONSIVE: &str = r#"
        while read -r line; do
            case "$line" in
                uci) echo "id name Fake"; echo "uciok" ;;
                go*)
                    echo "info depth 1 score cp 13 pv e7e5"
                    echo "info depth 2 score cp 20 pv e7e5"
                    echo "bestmove e7e5 ponder g1f3"
                    ;;
            esac
        done
    "#;

    #[test]
    fn test_best_reply() {
        let reply = fake_engine(RESPONSIVE)
            .best_reply(START_FEN, Duration::from_millis(50))
            .unwrap();

        assert_eq!(reply.best_move.as_deref(), Some("e7e5"));
        assert_eq!(reply.score, Some(Score::Centipawns(20)));
    }

    #[test]
    fn test_commands_reach_engine() {
        // Only answers with a move if it saw the expected position and movetime
        let script = format!(
            r#"
            while read -r line; do
                case "$line" in
                    "position fen {fen}") seen=yes ;;
                    "go movetime 250")
                        if [ "$seen" = yes ]; then echo "bestmove a7a6"; else echo "bestmove h7h6"; fi ;;
                    go*) echo "bestmove h7h5" ;;
                esac
            done
            "#,
            fen = START_FEN
        );

        let reply = fake_engine(&script)
            .best_reply(START_FEN, Duration::from_millis(250))
            .unwrap();

        assert_eq!(reply.best_move.as_deref(), Some("a7a6"));
    }

    #[test]
    fn test_no_move() {
        let script = r#"
            while read -r line; do
                case "$line" in
                    go*) echo "info depth 0 score mate 0"; echo "bestmove (none)" ;;
                esac
            done
        "#;

        let reply = fake_engine(script)
            .best_reply(START_FEN, Duration::from_millis(50))
            .unwrap();

        assert!(reply.is_game_over());
        assert_eq!(reply.score, Some(Score::Mate(0)));
    }

    #[test]
    fn test_output_closed_before_bestmove() {
        let script = r#"
            while read -r line; do
                case "$line" in
                    go*) echo "info depth 1 score cp 5"; exit 0 ;;
                esac
            done
        "#;

        let result = fake_engine(script).best_reply(START_FEN, Duration::from_millis(50));
        assert!(matches!(result, Err(EngineError::Closed)));
    }

    #[test]
    fn test_hung_engine_times_out() {
        let engine = UciEngine::new(EngineConfig {
            path: "sh".into(),
            args: vec!["-c".to_string(), "while read -r line; do :; done".to_string()],
            response_margin: Duration::from_millis(100),
        });

        let start = Instant::now();
        let result = engine.best_reply(START_FEN, Duration::from_millis(10));

        assert!(matches!(result, Err(EngineError::Timeout)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_chatty_engine_times_out() {
        // Never sends bestmove, and never stops talking
        let engine = UciEngine::new(EngineConfig {
            path: "sh".into(),
            args: vec![
                "-c".to_string(),
                "yes 'info depth 1 score cp 5 nodes 1 pv e7e5'".to_string(),
            ],
            response_margin: Duration::from_millis(100),
        });

        let start = Instant::now();
        let result = engine.best_reply(START_FEN, Duration::from_millis(10));

        assert!(matches!(result, Err(EngineError::Timeout)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_non_utf8_output_before_bestmove() {
        let script = r#"
            printf 'id name Motor\351\n'
            while read -r line; do
                case "$line" in
                    go*) echo "info depth 1 score cp 20"; echo "bestmove e7e5" ;;
                esac
            done
        "#;

        let reply = fake_engine(script)
            .best_reply(START_FEN, Duration::from_millis(50))
            .unwrap();

        assert_eq!(reply.best_move.as_deref(), Some("e7e5"));
        assert_eq!(reply.score, Some(Score::Centipawns(20)));
    }

    #[test]
    fn test_huge_think_time_does_not_overflow() {
        let reply = fake_engine(RESPONSIVE)
            .best_reply(START_FEN, Duration::MAX)
            .unwrap();
        assert_eq!(reply.best_move.as_deref(), Some("e7e5"));

        let now = Instant::now();
        assert_eq!(
            search_deadline(now, Duration::MAX, Duration::MAX),
            now + MAX_WAIT
        );
        assert_eq!(
            search_deadline(now, Duration::from_millis(500), Duration::from_secs(5)),
            now + Duration::from_millis(5500)
        );
    }

    #[test]
    fn test_missing_executable() {
        let engine = UciEngine::new(EngineConfig::new("/nonexistent/path/to/engine"));
        let result = engine.best_reply(START_FEN, Duration::from_millis(10));
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }
}
