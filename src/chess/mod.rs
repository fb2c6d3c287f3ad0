//! Implementation of chess rules: board representation, move validation,
//! castling and promotion, and game end detection.

pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod core;
pub mod outcome;
pub mod piece;
pub mod position;
pub mod special;
pub mod violation;
