//! Reference engine for chazz.
//!
//! Speaks the line protocol on stdin/stdout and answers every `go` with a
//! random legal move. A few switches script its behaviour for testing
//! the client against misbehaving engines.

#![warn(missing_docs)]

use anyhow::Result;
use chazz::ShakmatyRules;
use clap::Parser;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Random-move engine speaking `position` / `go` / `quit`
#[derive(Parser, Debug)]
#[command(name = "reference_engine")]
#[command(version)]
struct Args {
    /// Line to send for the next `go` instead of a move (repeatable, used in order)
    #[arg(long = "reply")]
    replies: Vec<String>,

    /// Never answer `go`
    #[arg(long)]
    silent: bool,

    /// Exit without answering when `go` arrives
    #[arg(long)]
    hang_up: bool,

    /// Wait this long before the first answer
    #[arg(long, default_value = "0")]
    first_reply_delay_ms: u64,

    /// Send the first answer in two pieces this many milliseconds apart
    #[arg(long, default_value = "0")]
    split_first_reply_ms: u64,

    /// Leave this many `go` commands unanswered before answering normally
    #[arg(long, default_value = "0")]
    skip_go: u32,

    /// Keep running after `quit` and after stdin closes
    #[arg(long)]
    ignore_quit: bool,
}

fn main() -> Result<()> {
    // Stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut scripted: VecDeque<String> = args.replies.into();
    let mut first_delay = Some(Duration::from_millis(args.first_reply_delay_ms));
    let mut first_split = Some(Duration::from_millis(args.split_first_reply_ms));
    let mut to_skip = args.skip_go;
    let mut rules = ShakmatyRules::new();
    let mut rng = rand::thread_rng();

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    info!("Reference engine ready");

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();

        if line == "quit" {
            if args.ignore_quit {
                debug!("Ignoring quit");
                continue;
            }
            debug!("Quit received");
            break;
        } else if let Some(fen) = line.strip_prefix("position ") {
            match ShakmatyRules::from_fen(fen) {
                Ok(position) => rules = position,
                Err(e) => warn!(error = %e, "Ignoring bad position"),
            }
        } else if line == "go" {
            if args.hang_up {
                debug!("Hanging up on go");
                return Ok(());
            }
            if args.silent {
                continue;
            }
            if to_skip > 0 {
                to_skip -= 1;
                debug!(remaining = to_skip, "Skipping go");
                continue;
            }
            if let Some(delay) = first_delay.take().filter(|d| !d.is_zero()) {
                std::thread::sleep(delay);
            }

            let reply = match scripted.pop_front() {
                Some(reply) => reply,
                None => rules
                    .legal_moves()
                    .choose(&mut rng)
                    .map(|mv| mv.to_string())
                    .unwrap_or_default(),
            };
            debug!(reply = %reply, "Answering go");
            if let Some(pause) = first_split.take().filter(|d| !d.is_zero()) {
                let cut = reply.char_indices().nth(2).map_or(reply.len(), |(i, _)| i);
                let (head, tail) = reply.split_at(cut);
                write!(stdout, "{}", head)?;
                stdout.flush()?;
                std::thread::sleep(pause);
                writeln!(stdout, "{}", tail)?;
            } else {
                writeln!(stdout, "{}", reply)?;
            }
            stdout.flush()?;
        } else if !line.is_empty() {
            warn!(line = %line, "Unknown command");
        }
    }

    if args.ignore_quit {
        debug!("Input closed, idling until killed");
        loop {
            std::thread::sleep(Duration::from_secs(1));
        }
    }
    Ok(())
}
