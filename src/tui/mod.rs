//! Terminal front end: logging setup, engine launch and the game loop.

mod presenter;
mod ui;

pub use presenter::TerminalPresenter;

use crate::chess::ShakmatyRules;
use crate::config::GameConfig;
use crate::controller::{GameController, GameEnd};
use crate::engine::EngineSession;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, instrument};

/// Sends tracing output to `path` so it does not interfere with the UI.
pub fn init_file_logging(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized
    Ok(())
}

/// Plays one game in the terminal against the configured engine.
///
/// The engine is started before the terminal is taken over, so a launch
/// failure is reported on a normal screen.
#[instrument(skip_all, fields(engine = ?config.engine_command()))]
pub async fn run_game(config: &GameConfig) -> Result<GameEnd> {
    let rules = match config.start_fen() {
        Some(fen) => ShakmatyRules::from_fen(fen)?,
        None => ShakmatyRules::new(),
    };

    let engine = EngineSession::start(config.engine_command())
        .context("Could not start the engine")?
        .with_reply_timeout(config.engine_timeout())
        .with_shutdown_grace(config.shutdown_grace());

    let presenter = TerminalPresenter::new()?;
    info!("Starting terminal game");

    let mut controller =
        GameController::new(rules, engine, presenter, config.controller_settings());
    controller.run().await
}
