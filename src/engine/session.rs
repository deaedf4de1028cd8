//! Child-process engine speaking the line protocol.
//!
//! ```text
//! -> position <FEN>
//! -> go
//! <- e2e4
//! -> quit
//! ```

use super::error::{EngineError, EngineErrorKind};
use crate::chess::{Move, parse_move};
use derive_more::Display;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// How long `shutdown` waits for the process to exit before killing it.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// How long a request waits for leftover output before sending `position`.
const DRAIN_WINDOW: Duration = Duration::from_millis(10);

/// Lifecycle of an engine process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionState {
    /// Process started, no request sent yet.
    Spawned,
    /// At least one request has been sent.
    Active,
    /// `quit` sent, waiting for the process to exit.
    Terminating,
    /// Process reaped.
    Closed,
}

/// One engine process for the lifetime of a game.
#[derive(Debug)]
pub struct EngineSession {
    program: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    state: SessionState,
    reply_timeout: Option<Duration>,
    shutdown_grace: Duration,
    /// Bytes of a line not yet terminated; survives a timed-out read.
    line_buf: Vec<u8>,
}

impl EngineSession {
    /// Spawns `command` (program followed by its arguments) with piped
    /// standard input and output.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument]
    pub fn start(command: &[String]) -> Result<Self, EngineError> {
        let (program, args) = command.split_first().ok_or_else(|| {
            EngineError::new(EngineErrorKind::Launch("empty engine command".to_string()))
        })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::new(EngineErrorKind::Launch(format!("{}: {}", program, e)))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| {
                EngineError::new(EngineErrorKind::Launch("stdin not captured".to_string()))
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| {
                EngineError::new(EngineErrorKind::Launch("stdout not captured".to_string()))
            })?;

        info!(program = %program, pid = ?child.id(), "Engine process spawned");

        Ok(Self {
            program: program.clone(),
            child,
            stdin: Some(stdin),
            stdout: Some(BufReader::new(stdout)),
            state: SessionState::Spawned,
            reply_timeout: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            line_buf: Vec::new(),
        })
    }

    /// Limits how long `request_move` waits for a reply. `None` waits forever.
    pub fn with_reply_timeout(mut self, reply_timeout: Option<Duration>) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Sets how long `shutdown` waits before killing the process.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Program the session was started with.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Asks the engine for a move in the position given as FEN.
    ///
    /// Blocks the caller until one line comes back (or the timeout expires).
    /// Output the engine has already sent is discarded first, so a reply
    /// that arrived after its request timed out is not taken for this one.
    #[instrument(skip(self), fields(program = %self.program, state = %self.state))]
    pub async fn request_move(&mut self, fen: &str) -> Result<Move, EngineError> {
        if matches!(self.state, SessionState::Terminating | SessionState::Closed) {
            return Err(EngineError::new(EngineErrorKind::Closed));
        }
        let stale_prefix = self.discard_pending().await?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EngineError::new(EngineErrorKind::Closed))?;

        let request = format!("position {}\ngo\n", fen);
        stdin.write_all(request.as_bytes()).await?;
        stdin.flush().await?;
        self.state = SessionState::Active;
        debug!(fen = %fen, "Sent position and go");

        let reply = self.read_reply(stale_prefix).await?;
        debug!(reply = %reply, "Engine replied");

        parse_move(&reply)
            .map_err(|e| EngineError::new(EngineErrorKind::Malformed(e.to_string())))
    }

    /// Reads and drops every line the engine has already sent.
    ///
    /// Returns whether the buffer still holds the start of a line, which
    /// then belongs to an earlier reply.
    async fn discard_pending(&mut self) -> Result<bool, EngineError> {
        let reader = self
            .stdout
            .as_mut()
            .ok_or_else(|| EngineError::new(EngineErrorKind::Closed))?;

        loop {
            let read = reader.read_until(b'\n', &mut self.line_buf);
            match timeout(DRAIN_WINDOW, read).await {
                Err(_) | Ok(Ok(0)) => return Ok(!self.line_buf.is_empty()),
                Ok(Ok(_)) => {
                    let line = String::from_utf8_lossy(&self.line_buf);
                    debug!(line = %line.trim(), "Discarded late reply");
                    self.line_buf.clear();
                }
                Ok(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// Reads the reply line, skipping the tail of an earlier reply when
    /// `stale_prefix` is set.
    async fn read_reply(&mut self, mut stale_prefix: bool) -> Result<String, EngineError> {
        let reader = self
            .stdout
            .as_mut()
            .ok_or_else(|| EngineError::new(EngineErrorKind::Closed))?;

        loop {
            let read = reader.read_until(b'\n', &mut self.line_buf);
            let n = match self.reply_timeout {
                Some(limit) => match timeout(limit, read).await {
                    Ok(result) => result?,
                    Err(_) => {
                        let timeout_ms = limit.as_millis() as u64;
                        warn!(timeout_ms, "Engine reply timed out");
                        return Err(EngineError::new(EngineErrorKind::Timeout(timeout_ms)));
                    }
                },
                None => read.await?,
            };

            if n == 0 && self.line_buf.is_empty() {
                return Err(EngineError::new(EngineErrorKind::EndOfStream));
            }

            let bytes = std::mem::take(&mut self.line_buf);
            let line = String::from_utf8_lossy(&bytes);
            if std::mem::take(&mut stale_prefix) {
                debug!(line = %line.trim(), "Discarded rest of late reply");
                continue;
            }

            let line = line.trim();
            if line.is_empty() {
                return Err(EngineError::new(EngineErrorKind::EmptyReply));
            }
            return Ok(line.to_string());
        }
    }

    /// Sends `quit`, closes the pipes and waits for the process to exit,
    /// killing it after the grace period. Calling it again is a no-op.
    #[instrument(skip(self), fields(program = %self.program, state = %self.state))]
    pub async fn shutdown(&mut self) -> Result<(), EngineError> {
        if self.state == SessionState::Closed {
            debug!("Engine already closed");
            return Ok(());
        }
        self.state = SessionState::Terminating;

        if let Some(mut stdin) = self.stdin.take() {
            let sent = async {
                stdin.write_all(b"quit\n").await?;
                stdin.flush().await
            }
            .await;
            if let Err(e) = sent {
                warn!(error = %e, "Failed to send quit to engine");
            }
        }
        self.stdout = None;

        let result = match timeout(self.shutdown_grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(%status, "Engine exited");
                Ok(())
            }
            Ok(Err(e)) => Err(EngineError::from(e)),
            Err(_) => {
                warn!(
                    grace_ms = self.shutdown_grace.as_millis() as u64,
                    "Engine ignored quit, killing it"
                );
                self.child.kill().await.map_err(EngineError::from)
            }
        };

        self.state = SessionState::Closed;
        result
    }
}

#[async_trait::async_trait]
impl super::MoveEngine for EngineSession {
    async fn request_move(&mut self, fen: &str) -> Result<Move, EngineError> {
        EngineSession::request_move(self, fen).await
    }

    async fn shutdown(&mut self) -> Result<(), EngineError> {
        EngineSession::shutdown(self).await
    }
}
