//! Reasons a selection or a move is rejected. The engine never aborts on an
//! illegal move: it reports a [`Violation`] and leaves the position unchanged.

use crate::chess::core::{PieceKind, Player, Square};

/// A broken rule of chess, with a human-readable explanation as its
/// [`std::fmt::Display`].
#[allow(variant_size_differences)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Origin and destination are the same square.
    #[error("piece cannot remain on the same square")]
    NullMove,
    /// The origin square is empty.
    #[error("no piece selected: {0} is empty")]
    NoPiece(Square),
    /// The selected piece belongs to someone else.
    #[error("not your piece: {kind} on {square} belongs to {owner}")]
    NotYourPiece {
        #[allow(missing_docs)]
        kind: PieceKind,
        #[allow(missing_docs)]
        square: Square,
        #[allow(missing_docs)]
        owner: Player,
    },
    /// The piece can not move in this shape at all (e.g. a knight moving
    /// diagonally).
    #[error("{0}")]
    Geometry(&'static str),
    /// A sliding piece or a pawn push runs into another piece.
    #[error("{mover} is blocked by {blocker} on {square}")]
    Blocked {
        #[allow(missing_docs)]
        mover: PieceKind,
        /// First piece on the path.
        blocker: PieceKind,
        #[allow(missing_docs)]
        square: Square,
    },
    /// The destination holds a piece of the mover.
    #[error("the {kind} on {square} belongs to you")]
    OwnPiece {
        #[allow(missing_docs)]
        kind: PieceKind,
        #[allow(missing_docs)]
        square: Square,
    },
    /// Kings are checked and mated, never taken off the board.
    #[error("cannot capture the King on {0}")]
    KingCapture(Square),
    #[allow(missing_docs)]
    #[error("would leave king in check")]
    LeavesKingInCheck,
    #[allow(missing_docs)]
    #[error("cannot castle: king has already moved")]
    KingMoved,
    #[allow(missing_docs)]
    #[error("cannot castle: rook has already moved")]
    RookMoved,
    /// The corner on the castling side has no rook of the mover.
    #[error("cannot castle: no rook on {0}")]
    NoRook(Square),
    #[allow(missing_docs)]
    #[error("cannot castle out of check")]
    CastleOutOfCheck,
    /// A square between the king and the rook is occupied.
    #[error("cannot castle: {blocker} on {square} is in the way")]
    CastlePathBlocked {
        #[allow(missing_docs)]
        blocker: PieceKind,
        #[allow(missing_docs)]
        square: Square,
    },
    /// The king would cross an attacked square.
    #[error("would castle through check on {0}")]
    CastleThroughCheck(Square),
    /// The king would land on an attacked square.
    #[error("would castle into check on {0}")]
    CastleIntoCheck(Square),
}

/// Coarse grouping of [`Violation`]s.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Nothing (or not a piece of the side to move) was selected.
    Selection,
    /// Piece-specific shape of the move is wrong, including staying in place.
    Geometry,
    Path,
    Capture,
    CheckSafety,
    Castling,
}

impl Violation {
    #[must_use]
    #[allow(missing_docs)]
    pub const fn category(self) -> Category {
        match self {
            Self::NoPiece(_) | Self::NotYourPiece { .. } => Category::Selection,
            Self::NullMove | Self::Geometry(_) => Category::Geometry,
            Self::Blocked { .. } => Category::Path,
            Self::OwnPiece { .. } | Self::KingCapture(_) => Category::Capture,
            Self::LeavesKingInCheck => Category::CheckSafety,
            Self::KingMoved
            | Self::RookMoved
            | Self::NoRook(_)
            | Self::CastleOutOfCheck
            | Self::CastlePathBlocked { .. }
            | Self::CastleThroughCheck(_)
            | Self::CastleIntoCheck(_) => Category::Castling,
        }
    }
}
