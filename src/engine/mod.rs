//! External move-generation engine.

mod error;
mod session;

pub use error::{EngineError, EngineErrorKind};
pub use session::{DEFAULT_SHUTDOWN_GRACE, EngineSession, SessionState};

use crate::chess::Move;

/// Anything that can be asked for a move in a position.
///
/// The game controller only sees this trait, so the blocking child-process
/// session can be swapped for another transport without touching the state
/// machine.
#[async_trait::async_trait]
pub trait MoveEngine: Send {
    /// Returns the engine's move for the position given as FEN.
    async fn request_move(&mut self, fen: &str) -> Result<Move, EngineError>;

    /// Stops the engine. Must be safe to call more than once.
    async fn shutdown(&mut self) -> Result<(), EngineError>;
}
