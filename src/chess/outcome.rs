//! Legal move enumeration and game end detection.
//!
//! Enumeration is exhaustive: every square of the player is tried against
//! every square of the board through the move validator. The board is small
//! and copying it is cheap, so there are no precomputed move tables to keep in
//! sync with the rules.

use std::fmt;

use itertools::iproduct;
use tracing::info;

use crate::chess::bitboard::Bitboard;
use crate::chess::core::{Move, Player, Square};
use crate::chess::position::Position;

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The side to move is in check and has no legal moves.
    Checkmate {
        #[allow(missing_docs)]
        winner: Player,
    },
    /// The side to move is not in check and has no legal moves.
    Stalemate,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "checkmate: {winner} wins"),
            Self::Stalemate => f.write_str("stalemate"),
        }
    }
}

impl Position {
    /// All legal moves of the side to move.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.legal_moves_for(self.us())
    }

    /// All moves `player` could legally make if it was their turn.
    #[must_use]
    pub fn legal_moves_for(&self, player: Player) -> Vec<Move> {
        self.candidates(player)
            .filter(|candidate| self.check_move_for(player, candidate.from(), candidate.to()).is_ok())
            .collect()
    }

    /// Squares the piece on `square` can legally move to. Used for move hints;
    /// empty for an empty square.
    #[must_use]
    pub fn legal_targets(&self, square: Square) -> Bitboard {
        let Some(piece) = self.board().piece_at(square) else {
            return Bitboard::empty();
        };
        Square::ALL
            .into_iter()
            .filter(|to| self.check_move_for(piece.owner(), square, *to).is_ok())
            .collect()
    }

    /// Decides whether the game is over. [`None`] while the side to move has
    /// at least one legal move.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        let player = self.us();
        let can_move = self
            .candidates(player)
            .any(|candidate| self.check_move_for(player, candidate.from(), candidate.to()).is_ok());
        if can_move {
            return None;
        }
        let outcome = if self.in_check() {
            Outcome::Checkmate {
                winner: player.opponent(),
            }
        } else {
            Outcome::Stalemate
        };
        info!(%outcome, "game over");
        Some(outcome)
    }

    /// Every (own piece square, other square) pair.
    fn candidates(&self, player: Player) -> impl Iterator<Item = Move> + '_ {
        iproduct!(self.board().pieces(player), Square::ALL)
            .filter(|(piece, to)| piece.square() != *to)
            .map(|(piece, to)| Move::new(piece.square(), to))
    }
}
