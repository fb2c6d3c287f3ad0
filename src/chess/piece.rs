//! Piece taxonomy: what each kind of piece is allowed to do on its own.
//!
//! [`Piece::movement`] answers whether the shape of a move is right for the
//! piece and whether its path is clear. It knows nothing about whose turn it
//! is, whether the destination holds an ally or whether the move exposes the
//! king: these rules are shared by all pieces and are applied once by the move
//! validator in [`crate::chess::position`].

use std::fmt;

use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Promotion, Rank, Square};
use crate::chess::special;
use crate::chess::violation::Violation;

const PAWN_FORWARD: &str = "Pawns must move at least 1 square forward";
const PAWN_RANGE: &str =
    "Pawns cannot move forward more than 1 square (or 2 squares on their first move)";
const PAWN_FILE: &str = "Pawns cannot move more than 1 file (and only when capturing)";
const PAWN_CAPTURE_RANGE: &str = "Pawns only capture 1 square diagonally";
const PAWN_DIAGONAL: &str = "Pawns cannot move diagonally unless it's a capture";
const ROOK_SHAPE: &str = "Rooks can only move along one axis at a time";
const BISHOP_SHAPE: &str = "Bishops only move diagonally";
const KNIGHT_SHAPE: &str = "Knights move in L-shapes (1 square along one axis and 2 along the other)";
const QUEEN_SHAPE: &str = "Queens move diagonally or in a straight line";
const KING_SHAPE: &str = "The King can only move one square at a time";

/// Kind-specific state of a piece. Only pawns, rooks and kings remember
/// whether they have moved: it gates the double pawn push and castling.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    King { has_moved: bool },
    Queen,
    Rook { has_moved: bool },
    Bishop,
    Knight,
    Pawn { has_moved: bool },
}

impl Role {
    const fn new(kind: PieceKind) -> Self {
        match kind {
            PieceKind::King => Self::King { has_moved: false },
            PieceKind::Queen => Self::Queen,
            PieceKind::Rook => Self::Rook { has_moved: false },
            PieceKind::Bishop => Self::Bishop,
            PieceKind::Knight => Self::Knight,
            PieceKind::Pawn => Self::Pawn { has_moved: false },
        }
    }

    const fn kind(self) -> PieceKind {
        match self {
            Self::King { .. } => PieceKind::King,
            Self::Queen => PieceKind::Queen,
            Self::Rook { .. } => PieceKind::Rook,
            Self::Bishop => PieceKind::Bishop,
            Self::Knight => PieceKind::Knight,
            Self::Pawn { .. } => PieceKind::Pawn,
        }
    }

    const fn has_moved(self) -> Option<bool> {
        match self {
            Self::King { has_moved } | Self::Rook { has_moved } | Self::Pawn { has_moved } => {
                Some(has_moved)
            },
            Self::Queen | Self::Bishop | Self::Knight => None,
        }
    }

    fn set_moved(&mut self, moved: bool) {
        match self {
            Self::King { has_moved } | Self::Rook { has_moved } | Self::Pawn { has_moved } => {
                *has_moved = moved;
            },
            Self::Queen | Self::Bishop | Self::Knight => {},
        }
    }
}

/// A piece standing on the board. Pieces are small values owned by exactly one
/// [`crate::chess::board::Cell`]; copying the board copies all of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    owner: Player,
    square: Square,
    role: Role,
}

impl Piece {
    /// Creates a piece that has not moved yet.
    #[must_use]
    pub const fn new(kind: PieceKind, owner: Player, square: Square) -> Self {
        Self {
            owner,
            square,
            role: Role::new(kind),
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn owner(&self) -> Player {
        self.owner
    }

    /// The square this piece believes it stands on. Always equal to the square
    /// of the cell holding it.
    #[must_use]
    pub const fn square(&self) -> Square {
        self.square
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn kind(&self) -> PieceKind {
        self.role.kind()
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether the piece has moved. [`None`] for queens, bishops and knights
    /// which do not track it.
    #[must_use]
    pub const fn has_moved(&self) -> Option<bool> {
        self.role.has_moved()
    }

    /// Overrides the has-moved flag; used when a position is set up from text
    /// rather than played from the start.
    #[must_use]
    pub(crate) fn with_moved(mut self, has_moved: bool) -> Self {
        self.role.set_moved(has_moved);
        self
    }

    /// Updates the piece after it travelled to `to`. The has-moved flag only
    /// ever goes from `false` to `true`.
    pub fn advance(&mut self, to: Square) {
        self.square = to;
        self.role.set_moved(true);
    }

    /// The piece a pawn turns into on the far rank: same color, same square.
    /// A promoted rook counts as moved so it can never castle.
    #[must_use]
    pub fn promoted(self, promotion: Promotion) -> Self {
        debug_assert_eq!(self.kind(), PieceKind::Pawn);
        Self::new(promotion.into(), self.owner, self.square).with_moved(true)
    }

    /// Checks whether the piece can reach `to` given its movement rules and the
    /// pieces standing in its way.
    ///
    /// # Errors
    ///
    /// Returns a geometric violation when the piece can not move in this
    /// shape, [`Violation::Blocked`] when another piece stands on the path and
    /// castling violations for a king's two-file move.
    pub fn movement(&self, to: Square, board: &Board) -> Result<(), Violation> {
        let (file_delta, rank_delta) = self.square.delta(to);
        let straight = file_delta == 0 || rank_delta == 0;
        let diagonal = file_delta.abs() == rank_delta.abs();
        match self.role {
            Role::Pawn { has_moved } => {
                self.pawn_movement(to, file_delta, rank_delta, has_moved, board)
            },
            Role::Rook { .. } if straight => self.slide(to, board),
            Role::Rook { .. } => Err(Violation::Geometry(ROOK_SHAPE)),
            Role::Bishop if diagonal => self.slide(to, board),
            Role::Bishop => Err(Violation::Geometry(BISHOP_SHAPE)),
            Role::Queen if straight || diagonal => self.slide(to, board),
            Role::Queen => Err(Violation::Geometry(QUEEN_SHAPE)),
            Role::Knight => match (file_delta.abs(), rank_delta.abs()) {
                (1, 2) | (2, 1) => Ok(()),
                _ => Err(Violation::Geometry(KNIGHT_SHAPE)),
            },
            Role::King { .. } if file_delta.abs() <= 1 && rank_delta.abs() <= 1 => Ok(()),
            Role::King { .. } if rank_delta == 0 && file_delta.abs() == 2 => {
                special::check_castling(board, self, to)
            },
            Role::King { .. } => Err(Violation::Geometry(KING_SHAPE)),
        }
    }

    fn pawn_movement(
        &self,
        to: Square,
        file_delta: i8,
        rank_delta: i8,
        has_moved: bool,
        board: &Board,
    ) -> Result<(), Violation> {
        let forward = rank_delta * self.owner.pawn_direction();
        if forward < 1 {
            return Err(Violation::Geometry(PAWN_FORWARD));
        }
        if forward > 2 || (forward == 2 && has_moved) {
            return Err(Violation::Geometry(PAWN_RANGE));
        }
        if file_delta.abs() > 1 {
            return Err(Violation::Geometry(PAWN_FILE));
        }
        if file_delta == 0 {
            // Pushes never capture: the destination has to be empty as well.
            self.slide(to, board)?;
            return match board.piece_at(to) {
                Some(occupant) => Err(self.blocked_by(&occupant)),
                None => Ok(()),
            };
        }
        if forward != 1 {
            return Err(Violation::Geometry(PAWN_CAPTURE_RANGE));
        }
        // No en passant: a diagonal step needs something to capture.
        match board.piece_at(to) {
            Some(_) => Ok(()),
            None => Err(Violation::Geometry(PAWN_DIAGONAL)),
        }
    }

    fn slide(&self, to: Square, board: &Board) -> Result<(), Violation> {
        match board.first_blocker(self.square, to) {
            Some(blocker) => Err(self.blocked_by(&blocker)),
            None => Ok(()),
        }
    }

    fn blocked_by(&self, blocker: &Self) -> Violation {
        Violation::Blocked {
            mover: self.kind(),
            blocker: blocker.kind(),
            square: blocker.square,
        }
    }

    /// Pawns are created unmoved only on their starting rank.
    pub(crate) fn on_starting_rank(&self) -> bool {
        self.square.rank() == Rank::pawns_starting(self.owner)
    }
}

impl fmt::Display for Piece {
    /// Writes the cell tag: kind letter followed by the color flag, e.g.
    /// `P(W)` for a white pawn.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind().symbol(), self.owner.tag())
    }
}
