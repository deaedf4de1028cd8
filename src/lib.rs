//! Chazz - play chess in the terminal against an external engine.
//!
//! # Architecture
//!
//! - **Chess**: domain types, coordinate notation and the rules-engine boundary
//! - **Engine**: child process speaking a line protocol (`position`, `go`, `quit`)
//! - **Controller**: square mapping, click selection and the turn state machine
//! - **TUI**: ratatui/crossterm presentation with mouse input
//!
//! # Example
//!
//! ```no_run
//! use chazz::{EngineSession, ShakmatyRules, Rules};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let rules = ShakmatyRules::new();
//! let mut engine = EngineSession::start(&["reference_engine".to_string()])?;
//! let reply = engine.request_move(&rules.to_fen()).await?;
//! println!("engine plays {}", reply);
//! engine.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod chess;
mod config;
mod controller;
mod engine;
mod tui;

// Crate-level exports - Chess domain
pub use chess::{
    Move, MoveParseError, Piece, PieceKind, PositionView, Rules, RulesError, ShakmatyRules, Side,
    Square, TerminationOutcome, parse_move, parse_square,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Controller
pub use controller::{
    Action, BoardGeometry, BoardView, ControllerSettings, GameController, GameEnd, InputEvent,
    PROMOTION_KIND, Phase, Presenter, SelectionState, to_square,
};

// Crate-level exports - Engine
pub use engine::{
    DEFAULT_SHUTDOWN_GRACE, EngineError, EngineErrorKind, EngineSession, MoveEngine, SessionState,
};

// Crate-level exports - Terminal front end
pub use tui::{TerminalPresenter, init_file_logging, run_game};
