//! Chazz - terminal chess client
//!
//! Plays a human against an external move engine.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use chazz::{EngineSession, GameConfig, GameEnd, Rules, ShakmatyRules};
use clap::Parser;
use cli::{Cli, Command, EngineArgs};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { engine, fen } => run_play(engine, fen).await,
        Command::CheckEngine { engine } => run_check_engine(engine).await,
    }
}

/// Builds the effective configuration: file (if present), then CLI overrides.
fn load_config(args: &EngineArgs) -> Result<GameConfig> {
    let mut config = GameConfig::load_or_default(&args.config)?;

    if let Some(command) = &args.engine {
        let parts: Vec<String> = command.split_whitespace().map(String::from).collect();
        config.set_engine_command(parts)?;
    }
    if args.timeout_ms.is_some() {
        config.set_engine_timeout_ms(args.timeout_ms)?;
    }

    let resolved = resolve_program(config.engine_command());
    config.set_engine_command(resolved)?;
    Ok(config)
}

/// Prefers an engine binary shipped next to this executable when the
/// command names a bare program that exists there.
fn resolve_program(command: &[String]) -> Vec<String> {
    let mut command = command.to_vec();
    let Some(program) = command.first_mut() else {
        return command;
    };
    if program.contains(std::path::MAIN_SEPARATOR) {
        return command;
    }
    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(program.as_str())))
        .filter(|path| path.is_file());
    if let Some(path) = sibling {
        *program = path.display().to_string();
    }
    command
}

/// Play one game in the terminal
#[instrument(skip_all)]
async fn run_play(args: EngineArgs, fen: Option<String>) -> Result<()> {
    let mut config = load_config(&args)?;
    if fen.is_some() {
        config.set_start_fen(fen);
    }

    chazz::init_file_logging(config.log_file())?;
    info!(config = ?config, "Starting chazz");

    match chazz::run_game(&config).await? {
        GameEnd::Finished(outcome) => println!("Game over: {}", outcome),
        GameEnd::Quit => println!("Game abandoned."),
    }
    Ok(())
}

/// Ask the engine for one move and report it
#[instrument(skip_all)]
async fn run_check_engine(args: EngineArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let rules = ShakmatyRules::new();

    let mut engine = EngineSession::start(config.engine_command())
        .context("Could not start the engine")?
        .with_reply_timeout(config.engine_timeout())
        .with_shutdown_grace(config.shutdown_grace());

    let reply = engine.request_move(&rules.to_fen()).await;
    engine.shutdown().await?;

    let mv = reply.context("Engine did not produce a move")?;
    if !rules.is_legal(&mv) {
        anyhow::bail!("Engine replied with illegal move {}", mv);
    }
    println!("{} replied {}", config.engine_command().join(" "), mv);
    Ok(())
}
