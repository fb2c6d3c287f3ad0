//! Chess rules engine: keeps the state of a standard chess game, validates
//! moves (including castling and promotion), never lets a player leave their
//! king in check and detects checkmate and stalemate.
//!
//! ```
//! use arbiter::chess::core::Square;
//! use arbiter::chess::position::Position;
//!
//! let mut position = Position::starting();
//! assert!(position.check_move(Square::E2, Square::E4).is_ok());
//! position.apply_move(Square::E2, Square::E4);
//! assert_eq!(position.at(Square::E4).to_string(), "P(W)");
//! assert!(position.check_move(Square::E4, Square::E5).is_err());
//! assert_eq!(position.outcome(), None);
//! ```
//!
//! [`Session`] wraps a position into a line-oriented text protocol which is
//! what the `arbiter` binary runs on standard input and output.

pub mod chess;

mod session;
pub use session::Session;
use shadow_rs::shadow;

shadow!(build);

/// Returns the full version that can be used to identify how the binary was
/// built in the first place.
fn version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints the version on startup.
pub fn print_engine_info() {
    println!("arbiter chess rules engine {}", version());
}

/// Prints the build type, target and whether the build is clean on startup.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    println!("Target: {}", build::BUILD_TARGET);
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
