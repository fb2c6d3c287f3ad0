#![no_main]
use arbiter::chess::position::Position;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use shakmaty::{CastlingMode, Chess, Position as ShakmatyPosition};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(position) = Position::from_fen(input) else {
        return;
    };
    let Ok(setup) = input.parse::<shakmaty::fen::Fen>() else {
        return;
    };
    let Ok(reference) = setup.into_position::<Chess>(CastlingMode::Standard) else {
        return;
    };
    assert_eq!(
        position
            .legal_moves()
            .iter()
            .map(ToString::to_string)
            .sorted()
            .collect::<Vec<_>>(),
        reference
            .legal_moves()
            .iter()
            .filter(|m| !m.is_en_passant())
            .map(|m| m.to_uci(CastlingMode::Standard).to_string()[..4].to_string())
            .sorted()
            .dedup()
            .collect::<Vec<_>>()
    );
    assert_eq!(position.in_check(), reference.is_check());
});
