//! Line-oriented text front end for a single game.
//!
//! [`Session::run`] reads one command per line and answers with exactly one
//! line: `ok ...` on success, `illegal: <reason>` when a selection or move
//! breaks the rules and `error: <reason>` for malformed input. The only
//! exception is `d` which dumps the board diagram.
//!
//! ```text
//! new                          start a new game
//! position startpos            same as `new`
//! position fen <fen>           set up a position
//! select <square>              check that the piece can be picked up
//! moves <square>               legal destinations of the piece
//! move <from> <to> [q|r|b|n]   make a move, optionally choosing promotion
//! check                        the piece giving check, if any
//! status                       side to move or how the game ended
//! captured                     captured pieces in capture order
//! fen                          current position as text
//! d                            board diagram
//! quit                         exit
//! ```

use std::io::{BufRead, Write};

use itertools::Itertools;
use tracing::{debug, info};

use crate::chess::core::{Promotion, Square};
use crate::chess::outcome::Outcome;
use crate::chess::position::Position;
use crate::session::command::Command;

mod command;

/// A game played through text commands: owns the position and the I/O
/// streams.
pub struct Session<R: BufRead, W: Write> {
    position: Position,
    outcome: Option<Outcome>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Creates a session with the starting position.
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self::with_position(Position::starting(), input, output)
    }

    /// Creates a session continuing from `position`.
    #[must_use]
    pub fn with_position(position: Position, input: R, output: W) -> Self {
        let outcome = position.outcome();
        Self {
            position,
            outcome,
            input,
            output,
        }
    }

    /// Reads and executes commands until `quit` or the end of input.
    ///
    /// # Errors
    ///
    /// Only I/O failures end the session with an error: malformed commands
    /// and illegal moves are reported to the output.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(self.output, "error: {e:#}")?;
                    continue;
                },
            };
            debug!(?command, "received");
            match command {
                Command::NewGame => self.set_position(Position::starting())?,
                Command::SetPosition { fen: None } => self.set_position(Position::starting())?,
                Command::SetPosition { fen: Some(fen) } => match Position::try_from(fen.as_str()) {
                    Ok(position) => self.set_position(position)?,
                    Err(e) => writeln!(self.output, "error: {e:#}")?,
                },
                Command::Select(square) => self.handle_select(square)?,
                Command::Moves(square) => self.handle_moves(square)?,
                Command::Move {
                    from,
                    to,
                    promotion,
                } => self.handle_move(from, to, promotion)?,
                Command::Check => self.handle_check()?,
                Command::Status => self.handle_status()?,
                Command::Captured => self.handle_captured()?,
                Command::Fen => writeln!(self.output, "ok {}", self.position)?,
                Command::Debug => writeln!(self.output, "{:?}", self.position)?,
                Command::Quit => break,
                Command::Empty => {},
                Command::Unknown(command) => {
                    writeln!(self.output, "error: unknown command: {command}")?;
                },
            }
            self.output.flush()?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn set_position(&mut self, position: Position) -> anyhow::Result<()> {
        self.outcome = position.outcome();
        self.position = position;
        info!(position = %self.position, "new position");
        match self.outcome {
            Some(outcome) => writeln!(self.output, "{outcome}")?,
            None => writeln!(self.output, "ok {}", self.position)?,
        }
        Ok(())
    }

    fn handle_select(&mut self, square: Square) -> anyhow::Result<()> {
        match self.position.check_selection(square) {
            Ok(piece) => writeln!(self.output, "ok {piece} on {square}")?,
            Err(violation) => writeln!(self.output, "illegal: {violation}")?,
        }
        Ok(())
    }

    fn handle_moves(&mut self, square: Square) -> anyhow::Result<()> {
        let targets = self.position.legal_targets(square);
        if targets.is_empty() {
            writeln!(self.output, "ok none")?;
        } else {
            writeln!(self.output, "ok {}", targets.iter().join(" "))?;
        }
        Ok(())
    }

    fn handle_move(&mut self, from: Square, to: Square, promotion: Promotion) -> anyhow::Result<()> {
        if let Some(outcome) = self.outcome {
            writeln!(self.output, "error: the game is over ({outcome})")?;
            return Ok(());
        }
        let record = match self.position.try_move(from, to, promotion) {
            Ok(record) => record,
            Err(violation) => {
                writeln!(self.output, "illegal: {violation}")?;
                return Ok(());
            },
        };
        self.outcome = self.position.outcome();
        match self.outcome {
            Some(outcome) => writeln!(self.output, "{outcome}")?,
            None if self.position.in_check() => {
                writeln!(self.output, "ok {} check", record.played)?;
            },
            None => writeln!(self.output, "ok {}", record.played)?,
        }
        Ok(())
    }

    fn handle_check(&mut self) -> anyhow::Result<()> {
        match self.position.check() {
            Some(attacker) => writeln!(
                self.output,
                "ok {} on {}",
                attacker.kind(),
                attacker.square()
            )?,
            None => writeln!(self.output, "ok no check")?,
        }
        Ok(())
    }

    fn handle_status(&mut self) -> anyhow::Result<()> {
        match self.outcome {
            Some(outcome) => writeln!(self.output, "{outcome}")?,
            None => writeln!(self.output, "ok {} to move", self.position.side_to_move())?,
        }
        Ok(())
    }

    fn handle_captured(&mut self) -> anyhow::Result<()> {
        let captured = self.position.captured();
        if captured.is_empty() {
            writeln!(self.output, "ok none")?;
        } else {
            writeln!(self.output, "ok {}", captured.iter().join(" "))?;
        }
        Ok(())
    }
}
