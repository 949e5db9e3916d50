use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use log::debug;
use uci::{Encoder, UciCommand};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Output lines queued between the reader thread and [`EngineProcess::recv_line`].
const LINE_BUFFER: usize = 256;

/// A running engine subprocess.
///
/// Stdout is drained by a background thread into a channel so reads can be
/// bounded by a deadline. Dropping the process kills it; the reader thread
/// then sees end-of-file and exits on its own.
pub struct EngineProcess {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    lines: Receiver<String>,
    encoder: Encoder,
}

impl EngineProcess {
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: config.path.clone(),
                source,
            })?;

        let Some((stdin, stdout)) = child.stdin.take().zip(child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EngineError::Pipe);
        };

        // Bounded, so an engine that floods output blocks on its pipe instead
        // of growing the queue
        let (tx, lines) = mpsc::sync_channel::<String>(LINE_BUFFER);
        let pid = child.id();

        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                // Engines are not obliged to print UTF-8 in names or info strings
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(&['\n', '\r'][..]).to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
            debug!("[engine {}] output closed", pid);
        });

        debug!("[engine {}] spawned {}", pid, config.path.display());

        Ok(Self {
            child,
            stdin: BufWriter::new(stdin),
            lines,
            encoder: Encoder {},
        })
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Writes one command line and flushes it straight away: the engine reads
    /// line by line and must see each terminator before it acts.
    pub fn send(&mut self, command: &UciCommand) -> Result<(), EngineError> {
        let line = self.encoder.encode(command);
        debug!("[engine {}] << {}", self.child.id(), line);

        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Blocks for the next output line, giving up at `deadline`. Lines already
    /// queued do not extend the deadline.
    pub fn recv_line(&self, deadline: Instant) -> Result<String, EngineError> {
        let now = Instant::now();
        if now >= deadline {
            return Err(EngineError::Timeout);
        }
        let remaining = deadline - now;

        match self.lines.recv_timeout(remaining) {
            Ok(line) => {
                debug!("[engine {}] >> {}", self.child.id(), line);
                Ok(line)
            }
            Err(RecvTimeoutError::Timeout) => Err(EngineError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::Closed),
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        // Best effort: a well-behaved engine quits, a hung one is killed regardless
        let _ = self.send(&UciCommand::Quit);
        let _ = self.child.kill();
        let _ = self.child.wait();
        debug!("[engine {}] terminated", self.child.id());
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    fn echo_engine() -> EngineConfig {
        EngineConfig {
            path: "sh".into(),
            args: vec![
                "-c".to_string(),
                r#"while read -r line; do echo "got $line"; done"#.to_string(),
            ],
            response_margin: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_send_and_receive() {
        let mut process = EngineProcess::spawn(&echo_engine()).unwrap();
        process.send(&UciCommand::IsReady).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        assert_eq!(process.recv_line(deadline).unwrap(), "got isready");
    }

    #[test]
    fn test_drop_kills_process() {
        let process = EngineProcess::spawn(&echo_engine()).unwrap();
        let proc_dir = format!("/proc/{}", process.id());
        assert!(Path::new(&proc_dir).exists());

        drop(process);

        // Killed and reaped, so the pid is gone
        assert!(!Path::new(&proc_dir).exists());
    }

    #[test]
    fn test_queued_lines_do_not_extend_deadline() {
        let mut process = EngineProcess::spawn(&echo_engine()).unwrap();
        process.send(&UciCommand::IsReady).unwrap();
        thread::sleep(Duration::from_millis(100));

        // The echo is waiting in the queue, but the deadline has passed
        assert!(matches!(
            process.recv_line(Instant::now()),
            Err(EngineError::Timeout)
        ));
    }

    #[test]
    fn test_invalid_utf8_line_is_kept() {
        let config = EngineConfig {
            path: "sh".into(),
            args: vec![
                "-c".to_string(),
                r#"printf 'id name Motor\351\r\n'; echo uciok; sleep 5"#.to_string(),
            ],
            response_margin: Duration::from_millis(500),
        };
        let process = EngineProcess::spawn(&config).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);

        assert_eq!(process.recv_line(deadline).unwrap(), "id name Motor\u{fffd}");
        assert_eq!(process.recv_line(deadline).unwrap(), "uciok");
    }

    #[test]
    fn test_recv_times_out() {
        let process = EngineProcess::spawn(&echo_engine()).unwrap();
        let deadline = Instant::now() + Duration::from_millis(50);
        assert!(matches!(
            process.recv_line(deadline),
            Err(EngineError::Timeout)
        ));
    }
}
