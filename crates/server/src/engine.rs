//! UCI engine used as the opponent's move source (async I/O)

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use chess_core::{Game, Move};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to spawn engine {path}: {source}")]
    Spawn {
        path: String,
        source: std::io::Error,
    },

    #[error("Engine I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine closed its output")]
    Closed,

    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Engine returned no move")]
    NoMove,

    #[error("Engine returned illegal move {0:?}")]
    IllegalMove(String),
}

/// Anything that picks the opponent's move for a game.
pub trait MoveSource: Send + Sync + 'static {
    fn best_move(
        &self,
        game: &Game,
        budget: Duration,
    ) -> impl Future<Output = Result<Move, EngineError>> + Send;
}

/// One running engine process.
struct EngineProcess {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl EngineProcess {
    /// Spawn the engine and run the UCI handshake
    async fn spawn(path: &str) -> Result<Self, EngineError> {
        let spawn_error = |source| EngineError::Spawn { path: path.to_string(), source };

        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let (Some(stdin), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            return Err(spawn_error(std::io::Error::other("engine pipes not captured")));
        };

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "UCI <");
        self.stdin.write_all(format!("{cmd}\n").as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line).await? == 0 {
            return Err(EngineError::Closed);
        }
        let trimmed = line.trim().to_string();
        debug!(line = trimmed.as_str(), "UCI >");
        Ok(trimmed)
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        while self.read_line().await? != expected {}
        Ok(())
    }

    /// Search the given position and return the `bestmove` token
    async fn search(&mut self, position: &str, movetime: Duration) -> Result<String, EngineError> {
        self.send(position).await?;
        self.send(&format!("go movetime {}", movetime.as_millis())).await?;
        loop {
            let line = self.read_line().await?;
            if line.split_whitespace().next() == Some("bestmove") {
                return parse_bestmove(&line);
            }
        }
    }

    async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.process.start_kill();
    }
}

/// `position` command describing the game from its start.
pub fn position_command(game: &Game) -> String {
    let mut cmd = match game.start_fen() {
        Some(fen) => format!("position fen {fen}"),
        None => "position startpos".to_string(),
    };
    let moves = game.uci_moves();
    if !moves.is_empty() {
        cmd.push_str(" moves ");
        cmd.push_str(&moves.join(" "));
    }
    cmd
}

/// Move token of a `bestmove` line
pub fn parse_bestmove(line: &str) -> Result<String, EngineError> {
    match line.split_whitespace().nth(1) {
        Some("(none)") | Some("0000") | None => Err(EngineError::NoMove),
        Some(token) => Ok(token.to_string()),
    }
}

/// Long-lived engine shared by all sessions. Searches are serialized; a
/// failed process is replaced and the search retried once.
pub struct UciEngine {
    path: String,
    grace: Duration,
    process: Mutex<Option<EngineProcess>>,
}

impl UciEngine {
    /// Start the engine. Fails if the binary cannot be spawned or does not
    /// complete the handshake within `grace`.
    pub async fn activate(path: &str, grace: Duration) -> Result<Self, EngineError> {
        let engine = Self {
            path: path.to_string(),
            grace,
            process: Mutex::new(None),
        };
        let process = engine.start().await?;
        *engine.process.lock().await = Some(process);
        info!(path, "Engine activated");
        Ok(engine)
    }

    async fn start(&self) -> Result<EngineProcess, EngineError> {
        timeout(self.grace, EngineProcess::spawn(&self.path))
            .await
            .map_err(|_| EngineError::Timeout(self.grace))?
    }

    async fn search_once(
        &self,
        slot: &mut Option<EngineProcess>,
        position: &str,
        budget: Duration,
    ) -> Result<String, EngineError> {
        if slot.is_none() {
            *slot = Some(self.start().await?);
        }
        let Some(process) = slot.as_mut() else {
            return Err(EngineError::Closed);
        };
        let limit = budget + self.grace;
        timeout(limit, process.search(position, budget))
            .await
            .map_err(|_| EngineError::Timeout(limit))?
    }

    /// Send `quit` and wait for the process to exit
    pub async fn shutdown(&self) {
        if let Some(mut process) = self.process.lock().await.take() {
            process.quit().await;
            info!("Engine stopped");
        }
    }
}

impl MoveSource for UciEngine {
    async fn best_move(&self, game: &Game, budget: Duration) -> Result<Move, EngineError> {
        let position = position_command(game);
        let mut slot = self.process.lock().await;

        let uci = match self.search_once(&mut slot, &position, budget).await {
            Ok(uci) => uci,
            Err(e) => {
                warn!("Engine search failed, restarting engine: {e}");
                *slot = None;
                match self.search_once(&mut slot, &position, budget).await {
                    Ok(uci) => uci,
                    Err(e) => {
                        *slot = None;
                        return Err(e);
                    }
                }
            }
        };

        game.find_uci(&uci).ok_or(EngineError::IllegalMove(uci))
    }
}
