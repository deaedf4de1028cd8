//! Command-line interface for chazz.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chazz - play chess in the terminal against an external engine
#[derive(Parser, Debug)]
#[command(name = "chazz")]
#[command(about = "Terminal chess client for line-protocol engines", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game against the engine
    Play {
        #[command(flatten)]
        engine: EngineArgs,

        /// Starting position as FEN (you play the side to move)
        #[arg(long)]
        fen: Option<String>,
    },

    /// Start the engine, ask for one move from the starting position and quit
    CheckEngine {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

/// Options shared by every command that talks to an engine.
#[derive(clap::Args, Debug)]
pub struct EngineArgs {
    /// Path to the game configuration file
    #[arg(short, long, default_value = "chazz.toml")]
    pub config: PathBuf,

    /// Override engine command (space-separated program and arguments)
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Override engine reply timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}
