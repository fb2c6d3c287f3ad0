//! [`Position`]: the state of one game (board, side to move, captured pieces)
//! and the move validator guarding every change to it.
//!
//! Moves are validated in three stages: the moving piece's own movement rule
//! ([`Piece::movement`]), the rule shared by all pieces that nobody lands on an
//! ally, and the self-check guard which plays the move on a scratch copy of the
//! board and rejects it if the mover's king ends up attacked.

use std::fmt;

use anyhow::{bail, Context};
use arrayvec::ArrayVec;
use tracing::{debug, info, trace};

use crate::chess::attacks::{self, Attackers};
use crate::chess::board::{Board, Cell};
use crate::chess::core::{
    File,
    Move,
    MoveFlags,
    PieceKind,
    Player,
    Promotion,
    Rank,
    Square,
    BOARD_WIDTH,
};
use crate::chess::piece::Piece;
use crate::chess::violation::Violation;

/// The last move applied to a [`Position`] and what it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    #[allow(missing_docs)]
    pub played: Move,
    #[allow(missing_docs)]
    pub flags: MoveFlags,
}

/// State of the chess game.
///
/// A position is created either at the start of the game
/// ([`Position::starting`]) or from text ([`Position::try_from`]) and is
/// changed only by applying moves. Queries never modify it: legality checks
/// work on copies of the [`Board`].
///
/// The text format is a subset of [Forsyth-Edwards Notation] (FEN): en passant
/// is not part of the rules this engine implements, so the en passant field
/// must be `-`. Castling availability is turned into has-moved flags of kings
/// and rooks, pawns outside of their starting rank are considered moved.
///
/// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    side_to_move: Player,
    captured: Vec<Piece>,
    last_move: Option<MoveRecord>,
}

impl Position {
    /// Creates the starting position of the standard chess variant.
    ///
    /// ```
    /// use arbiter::chess::position::Position;
    ///
    /// let starting_position = Position::starting();
    /// assert_eq!(
    ///     &starting_position.to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        Self::new(Board::starting(), Player::White)
    }

    /// Wraps an arbitrary board. The caller is responsible for it being
    /// playable (one king per side and so on); [`Position::from_fen`] checks
    /// this for positions coming from text.
    #[must_use]
    pub const fn new(board: Board, side_to_move: Player) -> Self {
        Self {
            board,
            side_to_move,
            captured: Vec::new(),
            last_move: None,
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    pub(super) const fn us(&self) -> Player {
        self.side_to_move
    }

    pub(super) const fn they(&self) -> Player {
        self.us().opponent()
    }

    /// The content of `square`. Its [`fmt::Display`] is the cell tag, e.g.
    /// `P(W)`.
    #[must_use]
    pub const fn at(&self, square: Square) -> Cell {
        self.board.at(square)
    }

    /// Pieces captured so far, in the order they were taken.
    #[must_use]
    pub fn captured(&self) -> &[Piece] {
        &self.captured
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn last_move(&self) -> Option<MoveRecord> {
        self.last_move
    }

    /// Checks that `square` holds a piece of the side to move and returns it.
    ///
    /// # Errors
    ///
    /// [`Violation::NoPiece`] or [`Violation::NotYourPiece`].
    pub fn check_selection(&self, square: Square) -> Result<Piece, Violation> {
        select(&self.board, square, self.us())
    }

    /// Decides whether the side to move may move the piece on `from` to
    /// `to`. The position is never modified.
    ///
    /// # Errors
    ///
    /// The first rule the move breaks.
    pub fn check_move(&self, from: Square, to: Square) -> Result<(), Violation> {
        let result = self.check_move_for(self.us(), from, to);
        if let Err(violation) = result {
            debug!(%from, %to, %violation, "move rejected");
        }
        result
    }

    /// Same as [`Position::check_move`] but for an arbitrary player, whether
    /// it's their turn or not.
    ///
    /// # Errors
    ///
    /// The first rule the move breaks.
    pub fn check_move_for(
        &self,
        player: Player,
        from: Square,
        to: Square,
    ) -> Result<(), Violation> {
        if from == to {
            return Err(Violation::NullMove);
        }
        let piece = select(&self.board, from, player)?;
        piece.movement(to, &self.board)?;
        if let Some(occupant) = self.board.piece_at(to) {
            if occupant.owner() == piece.owner() {
                return Err(Violation::OwnPiece {
                    kind: occupant.kind(),
                    square: to,
                });
            }
            if occupant.kind() == PieceKind::King {
                return Err(Violation::KingCapture(to));
            }
        }
        let mut scratch = self.board;
        let _ = scratch.play(from, to, Promotion::default());
        let exposed = attacks::in_check(&scratch, player);
        trace!(%from, %to, exposed, "simulated move");
        if exposed {
            return Err(Violation::LeavesKingInCheck);
        }
        Ok(())
    }

    /// Applies a move that passed [`Position::check_move`], promoting pawns to
    /// a queen. See [`Position::apply_move_with`].
    ///
    /// # Panics
    ///
    /// If `from` is empty.
    pub fn apply_move(&mut self, from: Square, to: Square) {
        self.apply_move_with(from, to, Promotion::default());
    }

    /// Applies a move that passed [`Position::check_move`]: moves the piece
    /// (and the rook when castling), replaces a pawn reaching the far rank
    /// with `promotion`, records the captured piece and passes the turn.
    ///
    /// # Panics
    ///
    /// If `from` is empty. Debug builds also panic if the move is illegal.
    pub fn apply_move_with(&mut self, from: Square, to: Square, promotion: Promotion) {
        debug_assert!(
            self.check_move(from, to).is_ok(),
            "applying unchecked move {from}{to} in {self}"
        );
        let _ = self.commit(from, to, promotion);
    }

    fn commit(&mut self, from: Square, to: Square, promotion: Promotion) -> MoveRecord {
        let played = self.board.play(from, to, promotion);
        if let Some(captured) = played.captured {
            self.captured.push(captured);
        }
        let record = MoveRecord {
            played: Move::new(from, to),
            flags: played.flags,
        };
        self.last_move = Some(record);
        info!(player = %self.us(), played = %record.played, flags = ?record.flags, "move applied");
        self.side_to_move = self.they();
        record
    }

    /// Validates the move and applies it if it is legal. The position is left
    /// unchanged otherwise.
    ///
    /// # Errors
    ///
    /// The first rule the move breaks.
    pub fn try_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Promotion,
    ) -> Result<MoveRecord, Violation> {
        self.check_move(from, to)?;
        Ok(self.commit(from, to, promotion))
    }

    /// Pieces attacking the king of the side to move.
    #[must_use]
    pub fn checkers(&self) -> Attackers {
        self.board
            .king(self.us())
            .map(|king| attacks::attackers(&self.board, king, self.they()))
            .unwrap_or_default()
    }

    /// One of the pieces giving check, if the side to move is in check.
    #[must_use]
    pub fn check(&self) -> Option<Piece> {
        self.checkers().first().copied()
    }

    #[must_use]
    #[allow(missing_docs)]
    pub fn in_check(&self) -> bool {
        attacks::in_check(&self.board, self.us())
    }

    /// Castling availability derived from the has-moved flags of kings and
    /// rooks still standing on their original squares.
    fn castling_rights(&self) -> String {
        let mut rights = String::new();
        for player in [Player::White, Player::Black] {
            let backrank = Rank::backrank(player);
            let unmoved = |square: Square, kind: PieceKind| {
                self.board.piece_at(square).is_some_and(|piece| {
                    piece.owner() == player
                        && piece.kind() == kind
                        && piece.has_moved() == Some(false)
                })
            };
            if !unmoved(Square::new(File::E, backrank), PieceKind::King) {
                continue;
            }
            for (file, symbol) in [(File::H, 'K'), (File::A, 'Q')] {
                if unmoved(Square::new(file, backrank), PieceKind::Rook) {
                    rights.push(match player {
                        Player::White => symbol,
                        Player::Black => symbol.to_ascii_lowercase(),
                    });
                }
            }
        }
        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }

    /// Parses a position from Forsyth-Edwards Notation.
    ///
    /// FEN ::=
    ///       Piece Placement
    ///   ' ' Side to move
    ///   ' ' Castling ability
    ///   ' ' En passant target square
    ///   ' ' Halfmove clock
    ///   ' ' Fullmove counter
    ///
    /// Everything after the side to move is optional. En passant target square
    /// can only be `-`. Halfmove clock and fullmove counter are checked for
    /// being numbers and otherwise ignored.
    ///
    /// NOTE: This expects properly-formatted inputs: no extra symbols or
    /// additional whitespace. Use [`Position::try_from`] for cleaning up the
    /// input.
    ///
    /// # Errors
    ///
    /// If the text is malformed or describes a position that can not occur
    /// in a game (missing kings, pawns on back ranks, the side not to move
    /// being in check, ...).
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split(' ');
        let Some(placement) = parts.next() else {
            bail!("incorrect FEN: missing pieces placement");
        };
        let mut board = parse_placement(placement)?;
        let side_to_move = match parts.next() {
            Some(value) => Player::try_from(value)?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        let rights = parse_castling(parts.next().unwrap_or("-"))?;
        match parts.next() {
            Some("-") | None => {},
            Some(value) => bail!("incorrect FEN: en passant is not supported, got {value}"),
        }
        match (parts.next(), parts.next()) {
            (None, _) => {},
            (Some(halfmove), Some(fullmove)) => {
                let _ = parse_counter(halfmove).context("incorrect FEN: halfmove clock")?;
                if parse_counter(fullmove).context("incorrect FEN: fullmove counter")? == 0 {
                    bail!("incorrect FEN: fullmove counter starts at 1");
                }
            },
            (Some(_), None) => bail!("incorrect FEN: missing fullmove counter"),
        }
        if parts.next().is_some() {
            bail!("trailing symbols are not allowed in FEN");
        }
        apply_history(&mut board, &rights)?;
        let position = Self::new(board, side_to_move);
        position.validate()?;
        Ok(position)
    }

    /// Rejects positions that can not be reached in a game.
    fn validate(&self) -> anyhow::Result<()> {
        for player in [Player::White, Player::Black] {
            let kings = self.board.count(player, PieceKind::King);
            if kings != 1 {
                bail!("{player} should have exactly one king, got {kings}");
            }
            let pawns = self.board.count(player, PieceKind::Pawn);
            if pawns > 8 {
                bail!("{player} can not have more than 8 pawns, got {pawns}");
            }
        }
        for rank in [Rank::One, Rank::Eight] {
            for file in File::ALL {
                let square = Square::new(file, rank);
                if self.board.piece_at(square).is_some_and(|piece| piece.kind() == PieceKind::Pawn) {
                    bail!("pawns can not stand on back ranks, got one on {square}");
                }
            }
        }
        if attacks::in_check(&self.board, self.they()) {
            bail!("{} is in check but it is {}'s turn", self.they(), self.us());
        }
        let checkers = self.checkers();
        if checkers.len() > 2 {
            bail!("the king can not be attacked by {} pieces at once", checkers.len());
        }
        Ok(())
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

fn select(board: &Board, square: Square, player: Player) -> Result<Piece, Violation> {
    let piece = board.piece_at(square).ok_or(Violation::NoPiece(square))?;
    if piece.owner() != player {
        return Err(Violation::NotYourPiece {
            kind: piece.kind(),
            square,
            owner: piece.owner(),
        });
    }
    Ok(piece)
}

fn parse_placement(placement: &str) -> anyhow::Result<Board> {
    let mut board = Board::empty();
    let mut rank_id = BOARD_WIDTH;
    for rank_fen in placement.split('/') {
        if rank_id == 0 {
            bail!("incorrect FEN: expected 8 ranks, got {placement}");
        }
        rank_id -= 1;
        let rank = Rank::try_from(rank_id)?;
        let mut file: u8 = 0;
        for symbol in rank_fen.chars() {
            if file >= BOARD_WIDTH {
                bail!("incorrect FEN: rank {rank_fen} is longer than {BOARD_WIDTH} squares");
            }
            match symbol {
                '0' => bail!("increment can not be 0"),
                '1'..='8' => {
                    file += symbol as u8 - b'0';
                    continue;
                },
                _ => (),
            }
            let kind = PieceKind::from_symbol(symbol)?;
            let owner = if symbol.is_ascii_uppercase() {
                Player::White
            } else {
                Player::Black
            };
            board.put(Piece::new(kind, owner, Square::new(file.try_into()?, rank)));
            file += 1;
        }
        if file != BOARD_WIDTH {
            bail!(
                "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {file}"
            );
        }
    }
    if rank_id != 0 {
        bail!("incorrect FEN: there should be 8 ranks, got {placement}");
    }
    Ok(board)
}

/// Castling rights as (player, file of the rook) pairs.
type CastlingRights = ArrayVec<(Player, File), 4>;

fn parse_castling(input: &str) -> anyhow::Result<CastlingRights> {
    let mut rights = CastlingRights::new();
    if input == "-" {
        return Ok(rights);
    }
    for symbol in input.chars() {
        let right = match symbol {
            'K' => (Player::White, File::H),
            'Q' => (Player::White, File::A),
            'k' => (Player::Black, File::H),
            'q' => (Player::Black, File::A),
            _ => bail!("incorrect FEN: unknown castling right '{symbol}' in {input}"),
        };
        if rights.contains(&right) {
            bail!("incorrect FEN: duplicate castling right '{symbol}' in {input}");
        }
        rights.push(right);
    }
    Ok(rights)
}

fn parse_counter(value: &str) -> anyhow::Result<u32> {
    if value.is_empty() || !value.bytes().all(|c| c.is_ascii_digit()) {
        bail!("counter can not contain anything other than digits, got '{value}'");
    }
    Ok(value.parse::<u32>()?)
}

/// Sets has-moved flags of the parsed pieces: kings and rooks keep castling
/// ability only when a right is listed for them, pawns are unmoved on their
/// starting rank.
fn apply_history(board: &mut Board, rights: &CastlingRights) -> anyhow::Result<()> {
    for (player, file) in rights {
        let backrank = Rank::backrank(*player);
        let expected = [
            (Square::new(File::E, backrank), PieceKind::King),
            (Square::new(*file, backrank), PieceKind::Rook),
        ];
        for (square, kind) in expected {
            let found = board
                .piece_at(square)
                .is_some_and(|piece| piece.owner() == *player && piece.kind() == kind);
            if !found {
                bail!("incorrect FEN: castling right needs {player} {kind} on {square}");
            }
        }
    }
    for square in Square::ALL {
        let Some(piece) = board.piece_at(square) else {
            continue;
        };
        let backrank = Rank::backrank(piece.owner());
        let unmoved = match piece.kind() {
            PieceKind::Pawn => piece.on_starting_rank(),
            PieceKind::King => {
                square == Square::new(File::E, backrank)
                    && rights.iter().any(|(player, _)| *player == piece.owner())
            },
            PieceKind::Rook => {
                square.rank() == backrank && rights.contains(&(piece.owner(), square.file()))
            },
            PieceKind::Queen | PieceKind::Bishop | PieceKind::Knight => continue,
        };
        board.put(piece.with_moved(!unmoved));
    }
    Ok(())
}

impl TryFrom<&str> for Position {
    type Error = anyhow::Error;

    /// Trims the input and strips an optional `fen ` prefix before parsing it
    /// with [`Position::from_fen`].
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        match input.strip_prefix("fen ") {
            Some(stripped) => Self::from_fen(stripped.trim_start()),
            None => Self::from_fen(input),
        }
    }
}

impl fmt::Display for Position {
    /// Prints the position in the supported FEN subset: placement, side to
    /// move, castling availability and an empty en passant field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side_to_move {
            Player::White => 'w',
            Player::Black => 'b',
        };
        write!(f, "{} {side} {} -", &self.board, self.castling_rights())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?}", &self.board)?;
        writeln!(f, "Player to move: {}", &self.side_to_move)?;
        write!(f, "Captured:")?;
        for piece in &self.captured {
            write!(f, " {piece}")?;
        }
        writeln!(f)?;
        if let Some(record) = self.last_move {
            writeln!(f, "Last move: {}", record.played)?;
        }
        write!(f, "FEN: {self}")
    }
}
