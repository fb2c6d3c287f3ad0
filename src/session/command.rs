use anyhow::{bail, Context};

use crate::chess::core::{Promotion, Square};

/// A line of input.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    NewGame,
    /// [`None`] sets up the starting position.
    SetPosition {
        fen: Option<String>,
    },
    Select(Square),
    Moves(Square),
    Move {
        from: Square,
        to: Square,
        promotion: Promotion,
    },
    Check,
    Status,
    Captured,
    Fen,
    Debug,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_square(parts: &[&str], index: usize, command: &str) -> anyhow::Result<Square> {
    let Some(square) = parts.get(index) else {
        bail!("`{command}` expects a square, e.g. `{command} e2`");
    };
    Square::try_from(*square)
}

fn parse_position(parts: &[&str]) -> anyhow::Result<Command> {
    match parts.get(1) {
        Some(&"startpos") if parts.len() == 2 => Ok(Command::SetPosition { fen: None }),
        Some(&"fen") if parts.len() > 2 => Ok(Command::SetPosition {
            fen: Some(parts[2..].join(" ")),
        }),
        _ => bail!("expected `position startpos` or `position fen <fen>`"),
    }
}

fn parse_move(parts: &[&str]) -> anyhow::Result<Command> {
    let from = parse_square(parts, 1, "move")?;
    let to = parse_square(parts, 2, "move").context("`move` expects two squares")?;
    let promotion = match parts.get(3) {
        None => Promotion::default(),
        Some(symbol) => {
            let mut chars = symbol.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) => Promotion::try_from(symbol)?,
                _ => bail!("promotion should be a single letter, got '{symbol}'"),
            }
        },
    };
    if parts.len() > 4 {
        bail!("unexpected trailing input: {}", parts[4..].join(" "));
    }
    Ok(Command::Move {
        from,
        to,
        promotion,
    })
}

impl Command {
    pub(super) fn parse(input: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some(name) = parts.first() else {
            return Ok(Self::Empty);
        };

        let command = match *name {
            "new" => Self::NewGame,
            "position" => parse_position(&parts)?,
            "select" => Self::Select(parse_square(&parts, 1, "select")?),
            "moves" => Self::Moves(parse_square(&parts, 1, "moves")?),
            "move" => parse_move(&parts)?,
            "check" => Self::Check,
            "status" => Self::Status,
            "captured" => Self::Captured,
            "fen" => Self::Fen,
            "d" => Self::Debug,
            "quit" => Self::Quit,
            _ => Self::Unknown(input.trim().to_string()),
        };
        Ok(command)
    }
}
