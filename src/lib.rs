//! A chess rule arbiter.
//!
//! [`game::ChessMatch`] owns the whole rule state of one match: it
//! validates moves, applies them reversibly, tracks captures, promotions
//! and the en passant window, and detects check and checkmate. The
//! [`console`] module is a terminal front end built on its accessors;
//! any other front end can drive a match the same way.

pub mod board;
pub mod console;
pub mod game;
pub mod movegen;
pub mod piece;
