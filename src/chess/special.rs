//! Castling and promotion: the two moves that change more than one piece (or
//! change the kind of a piece).

use arrayvec::ArrayVec;

use crate::chess::attacks;
use crate::chess::board::Board;
use crate::chess::core::{File, PieceKind, Rank, Square};
use crate::chess::piece::Piece;
use crate::chess::violation::Violation;

/// Checks every castling precondition for `king` travelling two files
/// towards `to`, in this order: the king has not moved, the rook is in its
/// corner and has not moved, the king is not in check, the squares between
/// king and rook are empty, the king does not pass through or land on an
/// attacked square.
///
/// # Errors
///
/// The first violated precondition.
pub(crate) fn check_castling(board: &Board, king: &Piece, to: Square) -> Result<(), Violation> {
    debug_assert_eq!(king.kind(), PieceKind::King);
    if king.has_moved() != Some(false) {
        return Err(Violation::KingMoved);
    }
    let Some((rook_square, _)) = castling_rook(king, to) else {
        return Err(Violation::Geometry("The King can only move one square at a time"));
    };
    let rook = board
        .piece_at(rook_square)
        .filter(|rook| rook.owner() == king.owner() && rook.kind() == PieceKind::Rook)
        .ok_or(Violation::NoRook(rook_square))?;
    if rook.has_moved() != Some(false) {
        return Err(Violation::RookMoved);
    }
    let opponent = king.owner().opponent();
    if attacks::is_attacked(board, king.square(), opponent) {
        return Err(Violation::CastleOutOfCheck);
    }
    if let Some(blocker) = board.first_blocker(king.square(), rook_square) {
        return Err(Violation::CastlePathBlocked {
            blocker: blocker.kind(),
            square: blocker.square(),
        });
    }
    for square in king_transit(king.square(), to) {
        if attacks::is_attacked(board, square, opponent) {
            return Err(if square == to {
                Violation::CastleIntoCheck(square)
            } else {
                Violation::CastleThroughCheck(square)
            });
        }
    }
    Ok(())
}

/// Origin and destination of the rook accompanying a castling king, or
/// [`None`] if `king` moving to `to` is not a castle.
#[must_use]
pub(crate) fn castling_rook(king: &Piece, to: Square) -> Option<(Square, Square)> {
    if king.kind() != PieceKind::King {
        return None;
    }
    let from = king.square();
    let rank = Rank::backrank(king.owner());
    if from != Square::new(File::E, rank) || to.rank() != rank {
        return None;
    }
    match to.file() {
        File::G => Some((Square::new(File::H, rank), Square::new(File::F, rank))),
        File::C => Some((Square::new(File::A, rank), Square::new(File::D, rank))),
        _ => None,
    }
}

/// Whether `pawn`, standing on its destination, has to be replaced.
#[must_use]
pub(crate) fn is_promotion(pawn: &Piece) -> bool {
    pawn.kind() == PieceKind::Pawn && pawn.square().rank() == Rank::promotion(pawn.owner())
}

/// Squares the king steps on while castling: origin excluded, destination
/// included.
fn king_transit(from: Square, to: Square) -> ArrayVec<Square, 2> {
    let step = from.delta(to).0.signum();
    let mut squares = ArrayVec::new();
    let mut square = from;
    while square != to {
        let Some(next) = square.offset(step, 0) else {
            break;
        };
        squares.push(next);
        square = next;
    }
    squares
}
