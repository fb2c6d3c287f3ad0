//! Attack scanning: which pieces of a given color attack a square.
//!
//! The scan starts from the target square and looks outward: sliding rays in
//! eight directions stop at the first occupied cell, jumps and steps are
//! probed directly. The target square does not have to be occupied, so the
//! same scan checks the squares a castling king passes through.

use arrayvec::ArrayVec;

use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Square};
use crate::chess::piece::Piece;

const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// A square can not be attacked by more than 16 pieces of one color.
pub type Attackers = ArrayVec<Piece, 16>;

/// Collects all pieces of `by` attacking `target`.
#[must_use]
pub fn attackers(board: &Board, target: Square, by: Player) -> Attackers {
    let mut result = Attackers::new();
    let mut push_if = |piece: Option<Piece>, kinds: &[PieceKind]| {
        if let Some(piece) = piece {
            if piece.owner() == by && kinds.contains(&piece.kind()) {
                result.push(piece);
            }
        }
    };
    for direction in ORTHOGONAL {
        push_if(first_on_ray(board, target, direction), &[PieceKind::Rook, PieceKind::Queen]);
    }
    for direction in DIAGONAL {
        push_if(first_on_ray(board, target, direction), &[PieceKind::Bishop, PieceKind::Queen]);
    }
    for (file_delta, rank_delta) in KNIGHT_JUMPS {
        push_if(neighbour(board, target, file_delta, rank_delta), &[PieceKind::Knight]);
    }
    // A pawn attacks the target from one rank behind it, as seen from the
    // pawn's side.
    for file_delta in [-1, 1] {
        push_if(
            neighbour(board, target, file_delta, -by.pawn_direction()),
            &[PieceKind::Pawn],
        );
    }
    for (file_delta, rank_delta) in KING_STEPS {
        push_if(neighbour(board, target, file_delta, rank_delta), &[PieceKind::King]);
    }
    result
}

/// First attacker of `target` found by the scan, if any.
#[must_use]
pub fn attacker(board: &Board, target: Square, by: Player) -> Option<Piece> {
    attackers(board, target, by).first().copied()
}

/// Whether any piece of `by` attacks `target`.
#[must_use]
pub fn is_attacked(board: &Board, target: Square, by: Player) -> bool {
    !attackers(board, target, by).is_empty()
}

/// Whether `player`'s king is attacked. A board without that king is never
/// in check.
#[must_use]
pub fn in_check(board: &Board, player: Player) -> bool {
    board
        .king(player)
        .is_some_and(|king| is_attacked(board, king, player.opponent()))
}

fn neighbour(board: &Board, from: Square, file_delta: i8, rank_delta: i8) -> Option<Piece> {
    board.piece_at(from.offset(file_delta, rank_delta)?)
}

fn first_on_ray(board: &Board, from: Square, (file_step, rank_step): (i8, i8)) -> Option<Piece> {
    let mut square = from;
    loop {
        square = square.offset(file_step, rank_step)?;
        if let Some(piece) = board.piece_at(square) {
            return Some(piece);
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn board_with(pieces: &[(PieceKind, Player, Square)]) -> Board {
        let mut board = Board::empty();
        for (kind, owner, square) in pieces {
            board.put(Piece::new(*kind, *owner, *square));
        }
        board
    }

    fn attacking_squares(board: &Board, target: Square, by: Player) -> Vec<Square> {
        let mut squares: Vec<_> = attackers(board, target, by)
            .iter()
            .map(Piece::square)
            .collect();
        squares.sort();
        squares
    }

    #[test]
    fn starting_position() {
        let board = Board::starting();
        assert_eq!(
            attacking_squares(&board, Square::F3, Player::White),
            vec![Square::G1, Square::E2, Square::G2]
        );
        assert!(!is_attacked(&board, Square::E4, Player::White));
        assert!(is_attacked(&board, Square::F6, Player::Black));
        assert!(!in_check(&board, Player::White));
        // Own pieces are never attackers.
        assert!(!is_attacked(&board, Square::F3, Player::Black));
    }

    #[test]
    fn rays_stop_at_first_piece() {
        let board = board_with(&[
            (PieceKind::Rook, Player::Black, Square::A8),
            (PieceKind::Knight, Player::White, Square::A5),
            (PieceKind::Bishop, Player::Black, Square::H8),
        ]);
        assert!(!is_attacked(&board, Square::A4, Player::Black));
        assert!(is_attacked(&board, Square::A6, Player::Black));
        // The knight shields a1 from the rook but not from the bishop.
        assert_eq!(
            attacker(&board, Square::A1, Player::Black).map(|piece| piece.kind()),
            Some(PieceKind::Bishop)
        );
    }

    #[test]
    fn pawns_attack_forward_only() {
        let board = board_with(&[
            (PieceKind::Pawn, Player::White, Square::E4),
            (PieceKind::Pawn, Player::Black, Square::D6),
        ]);
        assert!(is_attacked(&board, Square::D5, Player::White));
        assert!(is_attacked(&board, Square::F5, Player::White));
        assert!(!is_attacked(&board, Square::E5, Player::White));
        assert!(!is_attacked(&board, Square::D3, Player::White));
        assert!(is_attacked(&board, Square::C5, Player::Black));
        assert!(is_attacked(&board, Square::E5, Player::Black));
        assert!(!is_attacked(&board, Square::C7, Player::Black));
    }

    #[test]
    fn knights_and_kings() {
        let board = board_with(&[
            (PieceKind::Knight, Player::White, Square::B1),
            (PieceKind::King, Player::Black, Square::H8),
        ]);
        assert_eq!(attacking_squares(&board, Square::C3, Player::White), vec![Square::B1]);
        assert!(!is_attacked(&board, Square::B3, Player::White));
        assert!(is_attacked(&board, Square::G7, Player::Black));
        assert!(!is_attacked(&board, Square::F6, Player::Black));
        assert!(!in_check(&board, Player::White));
    }

    #[test]
    fn double_check() {
        let board = board_with(&[
            (PieceKind::King, Player::White, Square::E1),
            (PieceKind::Rook, Player::Black, Square::E8),
            (PieceKind::Knight, Player::Black, Square::D3),
        ]);
        assert!(in_check(&board, Player::White));
        assert_eq!(
            attacking_squares(&board, Square::E1, Player::Black),
            vec![Square::D3, Square::E8]
        );
    }
}
