use arbiter::chess::board::Cell;
use arbiter::chess::core::{File, MoveFlags, PieceKind, Player, Promotion, Rank, Square};
use arbiter::chess::outcome::Outcome;
use arbiter::chess::position::Position;
use arbiter::chess::violation::Violation;
use itertools::iproduct;
use pretty_assertions::assert_eq;

fn setup(input: &str) -> Position {
    Position::try_from(input).unwrap_or_else(|e| panic!("parsing legal position {input}: {e}"))
}

fn occupant(position: &Position, square: Square) -> Option<(PieceKind, Player)> {
    position
        .at(square)
        .piece()
        .map(|piece| (piece.kind(), piece.owner()))
}

#[test]
fn starting_layout() {
    let position = Position::starting();
    let backrank = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];
    for (file, rank) in iproduct!(File::ALL, Rank::ALL) {
        let square = Square::new(file, rank);
        let expected = match rank {
            Rank::One => Some((backrank[file as usize], Player::White)),
            Rank::Two => Some((PieceKind::Pawn, Player::White)),
            Rank::Seven => Some((PieceKind::Pawn, Player::Black)),
            Rank::Eight => Some((backrank[file as usize], Player::Black)),
            _ => None,
        };
        assert_eq!(occupant(&position, square), expected, "{square}");
    }
    assert_eq!(position.side_to_move(), Player::White);
    assert!(position.captured().is_empty());
    assert_eq!(position.last_move(), None);
}

#[test]
fn cell_tags() {
    let position = Position::starting();
    assert_eq!(position.at(Square::E1).to_string(), "K(W)");
    assert_eq!(position.at(Square::D8).to_string(), "Q(B)");
    assert_eq!(position.at(Square::G7).to_string(), "P(B)");
    assert_eq!(position.at(Square::E4).to_string(), "0");
    assert_eq!(
        Cell::from_tag("N(W)", Square::B1).unwrap(),
        position.at(Square::B1)
    );
}

#[test]
fn validation_does_not_mutate() {
    for position in [
        Position::starting(),
        setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -"),
        setup("4k3/1P6/8/8/r2BK3/8/8/8 w - -"),
    ] {
        let before = position.clone();
        for (from, to) in iproduct!(Square::ALL, Square::ALL) {
            let _ = position.check_move(from, to);
            let _ = position.check_move_for(position.side_to_move().opponent(), from, to);
        }
        let _ = position.legal_moves();
        let _ = position.outcome();
        assert_eq!(position, before);
    }
}

#[test]
fn self_check_guard() {
    // The bishop shields its king from the rook along the fourth rank.
    let position = setup("4k3/8/8/8/r2BK3/8/8/8 w - -");
    let bishop = position.board().piece_at(Square::D4).unwrap();
    assert_eq!(bishop.movement(Square::E5, position.board()), Ok(()));
    assert_eq!(
        position.check_move(Square::D4, Square::E5),
        Err(Violation::LeavesKingInCheck)
    );
    assert_eq!(
        Violation::LeavesKingInCheck.to_string(),
        "would leave king in check"
    );
    // Every bishop move leaves the rank.
    assert!(position.legal_targets(Square::D4).is_empty());
    assert_eq!(position.check_move(Square::E4, Square::F4), Ok(()));
}

#[test]
fn self_capture() {
    let position = Position::starting();
    assert_eq!(
        position.check_move(Square::A1, Square::A2),
        Err(Violation::OwnPiece {
            kind: PieceKind::Pawn,
            square: Square::A2,
        })
    );
    assert_eq!(
        position.check_move(Square::D1, Square::E1),
        Err(Violation::OwnPiece {
            kind: PieceKind::King,
            square: Square::E1,
        })
    );
}

#[test]
fn castling_through_pieces() {
    let position = setup("r3k2r/8/8/8/8/8/8/R3K1NR w KQkq -");
    assert_eq!(
        position.check_move(Square::E1, Square::G1),
        Err(Violation::CastlePathBlocked {
            blocker: PieceKind::Knight,
            square: Square::G1,
        })
    );
    assert_eq!(position.check_move(Square::E1, Square::C1), Ok(()));
}

#[test]
fn castling_through_attacks() {
    let position = setup("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq -");
    assert_eq!(
        position.check_move(Square::E1, Square::G1),
        Err(Violation::CastleThroughCheck(Square::F1))
    );
    let position = setup("r3k2r/8/8/8/8/8/6r1/R3K2R w KQkq -");
    assert_eq!(
        position.check_move(Square::E1, Square::G1),
        Err(Violation::CastleIntoCheck(Square::G1))
    );
    assert_eq!(position.check_move(Square::E1, Square::C1), Ok(()));
}

#[test]
fn castling_after_moves() {
    let mut position = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -");
    assert_eq!(position.check_move(Square::E1, Square::G1), Ok(()));
    position.apply_move(Square::E1, Square::F1);
    position.apply_move(Square::H8, Square::H7);
    position.apply_move(Square::F1, Square::E1);
    position.apply_move(Square::H7, Square::H8);
    // Both pieces are back on their original squares, but have moved.
    assert_eq!(
        position.check_move(Square::E1, Square::G1),
        Err(Violation::KingMoved)
    );
    assert_eq!(
        position.check_move(Square::E1, Square::C1),
        Err(Violation::KingMoved)
    );
    assert_eq!(
        position.check_move_for(Player::Black, Square::E8, Square::G8),
        Err(Violation::RookMoved)
    );
    assert_eq!(
        position.check_move_for(Player::Black, Square::E8, Square::C8),
        Ok(())
    );
    assert_eq!(position.to_string(), "r3k2r/8/8/8/8/8/8/R3K2R w q -");
}

#[test]
fn castling_moves_the_rook() {
    let mut position = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -");
    let record = position
        .try_move(Square::E1, Square::G1, Promotion::default())
        .unwrap();
    assert_eq!(record.flags, MoveFlags::KINGSIDE_CASTLE);
    assert_eq!(position.at(Square::G1).to_string(), "K(W)");
    assert_eq!(position.at(Square::F1).to_string(), "R(W)");
    assert!(position.at(Square::H1).is_empty());
    let record = position
        .try_move(Square::E8, Square::C8, Promotion::default())
        .unwrap();
    assert_eq!(record.flags, MoveFlags::QUEENSIDE_CASTLE);
    assert_eq!(position.to_string(), "2kr3r/8/8/8/8/8/8/R4RK1 w - -");
}

#[test]
fn promotion_to_queen() {
    let mut position = setup("4k3/P7/8/8/8/8/8/4K3 w - -");
    position.apply_move(Square::A7, Square::A8);
    let queen = position.at(Square::A8).piece().unwrap();
    assert_eq!(queen.kind(), PieceKind::Queen);
    assert_eq!(queen.owner(), Player::White);
    assert!(position.at(Square::A7).is_empty());
    assert_eq!(position.board().count(Player::White, PieceKind::Pawn), 0);
    assert_eq!(position.board().count(Player::White, PieceKind::Queen), 1);
    assert_eq!(
        position.last_move().unwrap().flags,
        MoveFlags::PROMOTION
    );
    // The new queen checks along the back rank.
    assert!(position.in_check());
}

#[test]
fn promotion_with_capture() {
    let mut position = setup("1r2k3/P7/8/8/8/8/8/4K3 w - -");
    let record = position
        .try_move(Square::A7, Square::B8, Promotion::Knight)
        .unwrap();
    assert_eq!(record.flags, MoveFlags::PROMOTION | MoveFlags::CAPTURE);
    assert_eq!(position.at(Square::B8).to_string(), "N(W)");
    assert_eq!(position.captured().len(), 1);
    assert_eq!(position.captured()[0].to_string(), "R(B)");
}

#[test]
fn fools_mate() {
    let mut position = Position::starting();
    for (from, to) in [
        (Square::F2, Square::F3),
        (Square::E7, Square::E5),
        (Square::G2, Square::G4),
    ] {
        position.apply_move(from, to);
        assert_eq!(position.outcome(), None);
    }
    position.apply_move(Square::D8, Square::H4);
    let checker = position.check().unwrap();
    assert_eq!(
        format!("{} on {}", checker.kind(), checker.square()),
        "Queen on h4"
    );
    assert_eq!(
        position.outcome(),
        Some(Outcome::Checkmate {
            winner: Player::Black
        })
    );
}

#[test]
fn kings_are_never_captured() {
    let mut position = Position::starting();
    for (from, to) in [
        (Square::F2, Square::F3),
        (Square::E7, Square::E5),
        (Square::G2, Square::G4),
        (Square::D8, Square::H4),
    ] {
        position.apply_move(from, to);
    }
    // The mating queen has a clear diagonal to e1, but the king is not a
    // target, not even in hints for the side that just moved.
    assert_eq!(
        position.check_move_for(Player::Black, Square::H4, Square::E1),
        Err(Violation::KingCapture(Square::E1))
    );
    let targets = position.legal_targets(Square::H4);
    assert!(!targets.contains(Square::E1));
    assert!(targets.contains(Square::F2));
    assert!(targets.contains(Square::G3));
}

#[test]
fn back_rank_checkmate() {
    let position = setup("3R2k1/5ppp/8/8/8/8/8/6K1 b - -");
    assert!(position.in_check());
    assert!(position.legal_moves().is_empty());
    assert_eq!(
        position.outcome(),
        Some(Outcome::Checkmate {
            winner: Player::White
        })
    );
}

#[test]
fn bare_king_stalemate() {
    let position = setup("k7/2Q5/1K6/8/8/8/8/8 b - -");
    assert!(!position.in_check());
    assert!(position.legal_moves().is_empty());
    assert_eq!(position.outcome(), Some(Outcome::Stalemate));
}

#[test]
fn knight_on_empty_board() {
    let position = setup("7k/8/8/8/8/8/8/1N5K w - -");
    let targets = position.legal_targets(Square::B1);
    assert_eq!(
        targets.iter().collect::<Vec<_>>(),
        vec![Square::D2, Square::A3, Square::C3]
    );
    for square in Square::ALL {
        let (file, rank) = Square::B1.delta(square);
        let l_shape = matches!((file.abs(), rank.abs()), (1, 2) | (2, 1));
        assert_eq!(targets.contains(square), l_shape, "{square}");
    }
}

#[test]
fn diagonal_pawn_moves_need_a_capture() {
    let position = setup("4k3/8/8/8/8/8/4P3/4K3 w - -");
    assert!(matches!(
        position.check_move(Square::E2, Square::D3),
        Err(Violation::Geometry(_))
    ));
    let position = setup("4k3/8/8/8/8/3p4/4P3/4K3 w - -");
    assert_eq!(position.check_move(Square::E2, Square::D3), Ok(()));
}

#[test]
fn moved_pieces_are_marked() {
    let mut position = setup("4k3/8/8/8/8/8/4P3/R3K3 w Q -");
    let pawn = position.at(Square::E2).piece().unwrap();
    assert_eq!(pawn.has_moved(), Some(false));
    position.apply_move(Square::E2, Square::E4);
    let pawn = position.at(Square::E4).piece().unwrap();
    assert_eq!(pawn.kind(), PieceKind::Pawn);
    assert_eq!(pawn.square(), Square::E4);
    assert_eq!(pawn.has_moved(), Some(true));
    assert_eq!(
        position.last_move().unwrap().flags,
        MoveFlags::DOUBLE_PAWN_PUSH
    );

    position.apply_move(Square::E8, Square::D7);
    position.apply_move(Square::A1, Square::A5);
    let rook = position.at(Square::A5).piece().unwrap();
    assert_eq!(rook.square(), Square::A5);
    assert_eq!(rook.has_moved(), Some(true));

    position.apply_move(Square::D7, Square::D6);
    position.apply_move(Square::E1, Square::D2);
    let king = position.at(Square::D2).piece().unwrap();
    assert_eq!(king.has_moved(), Some(true));
    // Pawns can only push twice on their first move.
    position.apply_move(Square::D6, Square::C6);
    assert!(matches!(
        position.check_move(Square::E4, Square::E6),
        Err(Violation::Geometry(_))
    ));
}

#[test]
fn knights_jump_over_pieces() {
    let position = Position::starting();
    assert_eq!(position.check_move(Square::G1, Square::F3), Ok(()));
    assert_eq!(
        position.check_move(Square::F1, Square::C4),
        Err(Violation::Blocked {
            mover: PieceKind::Bishop,
            blocker: PieceKind::Pawn,
            square: Square::E2,
        })
    );
}

#[test]
fn moving_out_of_turn() {
    let position = Position::starting();
    assert_eq!(
        position.check_move(Square::E7, Square::E5),
        Err(Violation::NotYourPiece {
            kind: PieceKind::Pawn,
            square: Square::E7,
            owner: Player::Black,
        })
    );
    assert_eq!(
        position.check_move(Square::E4, Square::E5),
        Err(Violation::NoPiece(Square::E4))
    );
    assert_eq!(
        position.check_move(Square::E2, Square::E2),
        Err(Violation::NullMove)
    );
}

#[test]
fn failed_moves_leave_position_intact() {
    let mut position = Position::starting();
    let before = position.clone();
    assert!(position
        .try_move(Square::E2, Square::E5, Promotion::default())
        .is_err());
    assert_eq!(position, before);
}
