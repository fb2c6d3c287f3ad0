use std::io;

use anyhow::Context;
use arbiter::chess::position::Position;
use arbiter::Session;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Plays a game of chess through text commands read from standard input, one
/// command per line (`move e2 e4`, `moves g1`, `status`, `d`, `quit`, ...).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// Starting position in FEN (en passant field must be `-`).
    #[arg(long)]
    fen: Option<String>,
    /// Log filter used when `RUST_LOG` is not set, e.g. `debug` or
    /// `arbiter=trace`. Logs are written to standard error.
    #[arg(long, default_value = "warn")]
    log_level: String,
    /// Do not print version information on startup.
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level: {}", config.log_level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if !config.quiet {
        arbiter::print_engine_info();
        arbiter::print_binary_info();
    }

    let position = match &config.fen {
        Some(fen) => Position::try_from(fen.as_str()).context("invalid --fen")?,
        None => Position::starting(),
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::with_position(position, stdin.lock(), stdout.lock()).run()
}
