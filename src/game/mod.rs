//! The match state machine and its rule oracle.

mod apply;
mod chess_match;

pub use chess_match::{ChessMatch, MatchState, MoveError, PromotionError};
