//! Square-centric [`Board`]: 64 [`Cell`]s and the tracked king squares.
//!
//! The board is a flat array of small value cells, so copying it is a plain
//! `memcpy`. Legality checks rely on that: a candidate move is played on a
//! scratch copy which is inspected and dropped.

use std::fmt::{self, Write};

use anyhow::bail;
use itertools::Itertools;

use crate::chess::core::{
    File,
    MoveFlags,
    PieceKind,
    Player,
    Promotion,
    Rank,
    Square,
    BOARD_SIZE,
};
use crate::chess::piece::Piece;
use crate::chess::special;

/// The content of one square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    #[allow(missing_docs)]
    Empty,
    #[allow(missing_docs)]
    Occupied(Piece),
}

impl Cell {
    #[must_use]
    #[allow(missing_docs)]
    pub const fn piece(self) -> Option<Piece> {
        match self {
            Self::Empty => None,
            Self::Occupied(piece) => Some(piece),
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Parses a cell tag as produced by [`Cell`]'s [`fmt::Display`]: `0` for
    /// an empty cell, kind letter and color flag otherwise (e.g. `R(B)`). Tags
    /// carry no movement history, so the piece is placed unmoved on `square`.
    ///
    /// # Errors
    ///
    /// If the tag is malformed.
    pub fn from_tag(tag: &str, square: Square) -> anyhow::Result<Self> {
        if tag == EMPTY_TAG {
            return Ok(Self::Empty);
        }
        let Some((kind, '(', color, ')')) = tag.chars().collect_tuple() else {
            bail!("cell tag should be '0' or look like 'P(W)', got '{tag}'");
        };
        if !kind.is_ascii_uppercase() {
            bail!("piece kind in a cell tag should be uppercase, got '{kind}'");
        }
        let owner = match color {
            'W' => Player::White,
            'B' => Player::Black,
            _ => bail!("color flag should be 'W' or 'B', got '{color}'"),
        };
        Ok(Self::Occupied(Piece::new(
            PieceKind::from_symbol(kind)?,
            owner,
            square,
        )))
    }
}

impl From<Option<Piece>> for Cell {
    fn from(piece: Option<Piece>) -> Self {
        piece.map_or(Self::Empty, Self::Occupied)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str(EMPTY_TAG),
            Self::Occupied(piece) => write!(f, "{piece}"),
        }
    }
}

/// What [`Board::play`] did besides moving the piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Played {
    /// Opponent piece removed from the destination square.
    pub captured: Option<Piece>,
    #[allow(missing_docs)]
    pub flags: MoveFlags,
}

/// Piece placement: the 8x8 grid plus the squares of both kings, updated
/// whenever a king is put on or taken off the board.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; BOARD_SIZE as usize],
    kings: [Option<Square>; 2],
}

impl Board {
    /// A board without any pieces.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_SIZE as usize],
            kings: [None; 2],
        }
    }

    /// Standard starting layout.
    #[must_use]
    pub fn starting() -> Self {
        const BACKRANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Self::empty();
        for player in [Player::White, Player::Black] {
            for (file, kind) in File::ALL.into_iter().zip(BACKRANK) {
                board.put(Piece::new(kind, player, Square::new(file, Rank::backrank(player))));
                board.put(Piece::new(
                    PieceKind::Pawn,
                    player,
                    Square::new(file, Rank::pawns_starting(player)),
                ));
            }
        }
        board
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn at(&self, square: Square) -> Cell {
        self.cells[square.index()]
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.at(square).piece()
    }

    /// Square of `player`'s king or [`None`] if the king is not on the board.
    #[must_use]
    pub const fn king(&self, player: Player) -> Option<Square> {
        self.kings[player.index()]
    }

    /// Places `piece` on its square, replacing whatever stood there.
    pub fn put(&mut self, piece: Piece) {
        let square = piece.square();
        let _ = self.take(square);
        if piece.kind() == PieceKind::King {
            self.kings[piece.owner().index()] = Some(square);
        }
        self.cells[square.index()] = Cell::Occupied(piece);
    }

    /// Removes and returns the piece on `square`.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = std::mem::take(&mut self.cells[square.index()]).piece()?;
        if piece.kind() == PieceKind::King && self.king(piece.owner()) == Some(square) {
            self.kings[piece.owner().index()] = None;
        }
        Some(piece)
    }

    /// Pieces of `player` in square order.
    pub fn pieces(&self, player: Player) -> impl Iterator<Item = Piece> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| cell.piece())
            .filter(move |piece| piece.owner() == player)
    }

    /// Number of pieces of the given kind and color.
    #[must_use]
    pub fn count(&self, player: Player, kind: PieceKind) -> usize {
        self.pieces(player).filter(|piece| piece.kind() == kind).count()
    }

    /// First piece standing strictly between `from` and `to`. Squares that do
    /// not share a file, rank or diagonal have nothing in between.
    #[must_use]
    pub fn first_blocker(&self, from: Square, to: Square) -> Option<Piece> {
        let (file_delta, rank_delta) = from.delta(to);
        let aligned = file_delta == 0 || rank_delta == 0 || file_delta.abs() == rank_delta.abs();
        if !aligned {
            return None;
        }
        let (file_step, rank_step) = (file_delta.signum(), rank_delta.signum());
        let mut square = from.offset(file_step, rank_step)?;
        while square != to {
            if let Some(piece) = self.piece_at(square) {
                return Some(piece);
            }
            square = square.offset(file_step, rank_step)?;
        }
        None
    }

    /// Executes a move without checking any rules: lifts the piece from
    /// `from`, removes whatever stands on `to`, moves the rook along when the
    /// king castles and replaces a pawn reaching the far rank with
    /// `promotion`.
    ///
    /// # Panics
    ///
    /// If `from` is empty.
    pub fn play(&mut self, from: Square, to: Square, promotion: Promotion) -> Played {
        let Some(mut piece) = self.take(from) else {
            panic!("can not play {from}{to}: {from} is empty");
        };
        let mut flags = MoveFlags::empty();
        if piece.kind() == PieceKind::Pawn && from.delta(to).1.abs() == 2 {
            flags |= MoveFlags::DOUBLE_PAWN_PUSH;
        }
        if let Some((rook_from, rook_to)) = special::castling_rook(&piece, to) {
            if let Some(mut rook) = self.take(rook_from) {
                rook.advance(rook_to);
                self.put(rook);
            }
            flags |= if rook_from.file() == File::H {
                MoveFlags::KINGSIDE_CASTLE
            } else {
                MoveFlags::QUEENSIDE_CASTLE
            };
        }
        let captured = self.take(to);
        if captured.is_some() {
            flags |= MoveFlags::CAPTURE;
        }
        piece.advance(to);
        if special::is_promotion(&piece) {
            piece = piece.promoted(promotion);
            flags |= MoveFlags::PROMOTION;
        }
        self.put(piece);
        Played { captured, flags }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for Board {
    /// Prints piece placement in Forsyth-Edwards Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            let mut empty_squares = 0i32;
            for file in File::ALL {
                if let Some(piece) = self.piece_at(Square::new(file, rank)) {
                    if empty_squares != 0 {
                        write!(f, "{empty_squares}")?;
                        empty_squares = 0;
                    }
                    let symbol = piece.kind().symbol();
                    f.write_char(match piece.owner() {
                        Player::White => symbol,
                        Player::Black => symbol.to_ascii_lowercase(),
                    })?;
                } else {
                    empty_squares += 1;
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if rank != Rank::One {
                const RANK_SEPARATOR: char = '/';
                f.write_char(RANK_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    /// Dumps the cell tags with rank 8 at the top and the coordinates along
    /// the edges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            write!(f, "{rank} ")?;
            let row = File::ALL
                .into_iter()
                .map(|file| format!("{:<4}", self.at(Square::new(file, rank)).to_string()))
                .join(SQUARE_SEPARATOR);
            writeln!(f, "{}", row.trim_end())?;
        }
        let files = File::ALL
            .into_iter()
            .map(|file| format!("{file:<4}"))
            .join(SQUARE_SEPARATOR);
        write!(f, "  {}", files.trim_end())
    }
}

const EMPTY_TAG: &str = "0";
const SQUARE_SEPARATOR: &str = " ";
