//! Engine session error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong while talking to the engine process.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EngineErrorKind {
    /// The executable could not be started.
    #[display("failed to launch engine: {_0}")]
    Launch(String),
    /// Reading from or writing to the pipes failed.
    #[display("engine I/O failed: {_0}")]
    Io(String),
    /// The engine answered with an empty line.
    #[display("engine replied with an empty line")]
    EmptyReply,
    /// The engine closed its output.
    #[display("engine closed its output")]
    EndOfStream,
    /// The reply was not a coordinate move.
    #[display("engine reply is not a move: {_0}")]
    Malformed(String),
    /// No reply arrived within the configured timeout.
    #[display("engine did not reply within {_0} ms")]
    Timeout(u64),
    /// The session was already shut down.
    #[display("engine session is closed")]
    Closed,
}

/// Engine error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Engine error: {} at {}:{}", kind, file, line)]
pub struct EngineError {
    /// Error classification.
    pub kind: EngineErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl EngineError {
    /// Creates a new engine error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: EngineErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether the process never started. This is the only fatal case;
    /// every other kind is a failed move request the game survives.
    pub fn is_launch(&self) -> bool {
        matches!(self.kind, EngineErrorKind::Launch(_))
    }
}

impl From<std::io::Error> for EngineError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(EngineErrorKind::Io(err.to_string()))
    }
}
