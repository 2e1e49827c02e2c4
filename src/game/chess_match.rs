use std::fmt;

use log::{debug, trace};

use crate::board::{Board, Coordinate};
use crate::movegen::{self, Reachability};
use crate::piece::{Color, Piece, PieceKind};

use super::apply;

/// Why a requested move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("there is no piece on {0}")]
    EmptySource(Coordinate),
    #[error("the piece on {0} is not yours")]
    NotYourPiece(Coordinate),
    #[error("the piece on {0} has no possible moves")]
    NoPossibleMoves(Coordinate),
    #[error("the piece on {from} cannot move to {to}")]
    IllegalDestination { from: Coordinate, to: Coordinate },
    #[error("the move would leave your own king in check")]
    ExposesKing,
    #[error("a promotion must be completed first")]
    PromotionPending,
    #[error("the match is over")]
    MatchOver,
}

/// Why a promotion choice was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PromotionError {
    #[error("no promotion is pending")]
    NothingPending,
    #[error("a pawn cannot be promoted to a {0:?}")]
    InvalidKind(PieceKind),
}

/// Where the match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Moves are accepted for the side to move.
    InProgress,
    /// A pawn reached the far rank; `choose_promotion` must run next.
    PromotionPending,
    /// Terminal. No further moves are accepted.
    Checkmate,
}

/// A chess match: the board plus every piece of rule state needed to
/// validate and apply moves.
///
/// All mutation goes through [`perform_move`] and [`choose_promotion`];
/// a refused operation leaves the match observably unchanged. Rendering
/// and other read-only concerns work off the accessors.
///
/// [`perform_move`]: ChessMatch::perform_move
/// [`choose_promotion`]: ChessMatch::choose_promotion
pub struct ChessMatch {
    board: Board,
    turn: u32,
    side_to_move: Color,
    check: bool,
    checkmate: bool,
    en_passant_vulnerable: Option<Coordinate>,
    pending_promotion: Option<Coordinate>,
    captured: Vec<Piece>,
}

impl ChessMatch {
    /// Starts a match from the standard opening position.
    pub fn new() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut pieces = Vec::with_capacity(32);
        for (color, back_row, pawn_row) in [(Color::White, 7u8, 6u8), (Color::Black, 0, 1)] {
            for col in 0..8u8 {
                if let Some(coord) = Coordinate::new(back_row, col) {
                    pieces.push((coord, Piece::new(BACK_RANK[col as usize], color)));
                }
                if let Some(coord) = Coordinate::new(pawn_row, col) {
                    pieces.push((coord, Piece::new(PieceKind::Pawn, color)));
                }
            }
        }
        Self::from_position(pieces, Color::White)
    }

    /// Starts a match from an arbitrary position.
    ///
    /// Computes the check flag for `side_to_move` up front. A position
    /// where that side is already mated enters `Checkmate` directly, with
    /// the other side recorded as the winner.
    ///
    /// # Panics
    ///
    /// Panics unless the position holds exactly one king per color, or if
    /// two pieces share a square. The rule oracle cannot answer for a
    /// board without kings.
    pub fn from_position(
        pieces: impl IntoIterator<Item = (Coordinate, Piece)>,
        side_to_move: Color,
    ) -> Self {
        let mut board = Board::empty();
        for (coord, piece) in pieces {
            board.place(coord, piece);
        }
        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces()
                .filter(|(_, p)| p.kind == PieceKind::King && p.color == color)
                .count();
            assert!(
                kings == 1,
                "position must hold exactly one {color} king, found {kings}"
            );
        }

        let mut game = Self {
            board,
            turn: 1,
            side_to_move,
            check: false,
            checkmate: false,
            en_passant_vulnerable: None,
            pending_promotion: None,
            captured: Vec::new(),
        };
        game.check = game.is_in_check(side_to_move);
        if game.check && game.is_checkmated(side_to_move) {
            game.checkmate = true;
            game.side_to_move = side_to_move.opposite();
        }
        game
    }

    /// Legal destinations for the piece on `source`.
    ///
    /// Either side's piece may be queried. Destinations that would leave
    /// that piece's own king attacked are filtered out, so for the side
    /// to move the result is exactly the set [`perform_move`] accepts.
    ///
    /// [`perform_move`]: ChessMatch::perform_move
    pub fn possible_moves(&self, source: Coordinate) -> Result<Reachability, MoveError> {
        let Some(&piece) = self.board.piece_at(source) else {
            return Err(MoveError::EmptySource(source));
        };

        let raw = movegen::reachable_from(&self.board, source, self.en_passant_vulnerable);
        let mut legal = Reachability::default();
        let mut scratch = self.board.clone();
        for target in raw.iter() {
            let record = apply::apply(&mut scratch, source, target);
            if !in_check_on(&scratch, piece.color) {
                legal.mark(target);
            }
            apply::undo(&mut scratch, record);
        }
        Ok(legal)
    }

    /// Plays `from -> to` for the side to move.
    ///
    /// On success the captured piece, if any, is returned and appended to
    /// the ledger. A pawn reaching the far rank leaves the match in
    /// `PromotionPending`; the half-move then completes in
    /// [`choose_promotion`], not here.
    ///
    /// [`choose_promotion`]: ChessMatch::choose_promotion
    pub fn perform_move(
        &mut self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Piece>, MoveError> {
        if self.checkmate {
            return Err(MoveError::MatchOver);
        }
        if self.pending_promotion.is_some() {
            return Err(MoveError::PromotionPending);
        }

        let piece = self.validate_source(from)?;
        let reachable = movegen::reachable_from(&self.board, from, self.en_passant_vulnerable);
        if reachable.is_empty() {
            return Err(MoveError::NoPossibleMoves(from));
        }
        if !reachable.contains(to) {
            return Err(MoveError::IllegalDestination { from, to });
        }

        let record = apply::apply(&mut self.board, from, to);
        if self.is_in_check(self.side_to_move) {
            apply::undo(&mut self.board, record);
            trace!("rejected {from} -> {to}: leaves the own king attacked");
            return Err(MoveError::ExposesKing);
        }

        let captured = record.captured.map(|(_, taken)| taken);
        if let Some(taken) = captured {
            self.captured.push(taken);
        }
        debug!("{} moves {from} -> {to}", self.side_to_move);

        // A pawn on the far rank holds the half-move open for promotion.
        if piece.kind == PieceKind::Pawn && to.row() == promotion_row(piece.color) {
            self.pending_promotion = Some(to);
            debug!("promotion pending on {to}");
            return Ok(captured);
        }

        let double_step =
            piece.kind == PieceKind::Pawn && (to.row() as i8 - from.row() as i8).abs() == 2;
        self.finish_half_move(double_step.then_some(to));
        Ok(captured)
    }

    /// Replaces the pawn awaiting promotion and completes the half-move.
    ///
    /// Returns the piece now standing on the promotion square. Refusing
    /// an invalid kind leaves the pawn and the pending state untouched.
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<Piece, PromotionError> {
        let Some(square) = self.pending_promotion else {
            return Err(PromotionError::NothingPending);
        };
        if !matches!(
            kind,
            PieceKind::Bishop | PieceKind::Knight | PieceKind::Rook | PieceKind::Queen
        ) {
            return Err(PromotionError::InvalidKind(kind));
        }

        let pawn = self
            .board
            .remove(square)
            .expect("pending promotion square must hold the pawn");
        let promoted = Piece::new(kind, pawn.color);
        self.board.place(square, promoted);
        self.pending_promotion = None;
        debug!("{} promotes to {} on {square}", pawn.color, kind.letter());

        self.finish_half_move(None);
        Ok(promoted)
    }

    /// Turn number, starting at 1 and advancing per completed half-move.
    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The side whose move is expected. Once the match is over this stays
    /// the winner.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// True if the side facing the move is in check. After mate this
    /// describes the defeated side.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.check
    }

    /// True once the match ended in checkmate.
    #[inline]
    pub fn in_checkmate(&self) -> bool {
        self.checkmate
    }

    /// Square of the pawn that advanced two ranks last half-move and may
    /// be captured en passant right now.
    #[inline]
    pub fn en_passant_vulnerable(&self) -> Option<Coordinate> {
        self.en_passant_vulnerable
    }

    /// Square of the pawn awaiting its promotion choice.
    #[inline]
    pub fn pending_promotion(&self) -> Option<Coordinate> {
        self.pending_promotion
    }

    /// Every piece captured so far, in capture order.
    pub fn captured_pieces(&self) -> &[Piece] {
        &self.captured
    }

    /// The piece occupying `coord`, if any.
    #[inline]
    pub fn piece_at(&self, coord: Coordinate) -> Option<&Piece> {
        self.board.piece_at(coord)
    }

    /// The position as a row-major matrix, row 0 (rank 8) first.
    pub fn pieces(&self) -> [[Option<Piece>; 8]; 8] {
        self.board.to_matrix()
    }

    /// Where the match stands.
    pub fn state(&self) -> MatchState {
        if self.checkmate {
            MatchState::Checkmate
        } else if self.pending_promotion.is_some() {
            MatchState::PromotionPending
        } else {
            MatchState::InProgress
        }
    }

    /// The side that delivered mate, while [`state`] is `Checkmate`.
    ///
    /// [`state`]: ChessMatch::state
    pub fn winner(&self) -> Option<Color> {
        self.checkmate.then_some(self.side_to_move)
    }

    fn validate_source(&self, source: Coordinate) -> Result<Piece, MoveError> {
        let Some(&piece) = self.board.piece_at(source) else {
            return Err(MoveError::EmptySource(source));
        };
        if piece.color != self.side_to_move {
            return Err(MoveError::NotYourPiece(source));
        }
        Ok(piece)
    }

    /// Steps shared by regular moves and completed promotions: open or
    /// close the en passant window, recompute the opponent's check and
    /// checkmate, then advance the turn.
    ///
    /// The window updates before the mate test so that an en passant
    /// capture counts among the opponent's escapes.
    fn finish_half_move(&mut self, new_en_passant: Option<Coordinate>) {
        let opponent = self.side_to_move.opposite();
        self.en_passant_vulnerable = new_en_passant;

        self.check = self.is_in_check(opponent);
        if self.check && self.is_checkmated(opponent) {
            self.checkmate = true;
            debug!("checkmate, {} wins", self.side_to_move);
            return;
        }

        self.turn += 1;
        self.side_to_move = opponent;
    }

    fn is_in_check(&self, color: Color) -> bool {
        in_check_on(&self.board, color)
    }

    /// True if `color` is in check and no move of theirs escapes it.
    ///
    /// Tries every reachable target of every piece of that color via
    /// apply/undo. Exhaustive on purpose; matches run at human pace.
    fn is_checkmated(&mut self, color: Color) -> bool {
        if !self.is_in_check(color) {
            return false;
        }

        let origins: Vec<Coordinate> = self
            .board
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .map(|(coord, _)| coord)
            .collect();
        for from in origins {
            let reachable = movegen::reachable_from(&self.board, from, self.en_passant_vulnerable);
            for to in reachable.iter() {
                let record = apply::apply(&mut self.board, from, to);
                let escaped = !self.is_in_check(color);
                apply::undo(&mut self.board, record);
                if escaped {
                    return false;
                }
            }
        }
        true
    }
}

impl Default for ChessMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChessMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChessMatch")
            .field("turn", &self.turn)
            .field("side_to_move", &self.side_to_move)
            .field("state", &self.state())
            .field("check", &self.check)
            .field("en_passant_vulnerable", &self.en_passant_vulnerable)
            .finish_non_exhaustive()
    }
}

fn promotion_row(color: Color) -> u8 {
    match color {
        Color::White => 0,
        Color::Black => 7,
    }
}

fn king_square(board: &Board, color: Color) -> Coordinate {
    board
        .pieces()
        .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == color)
        .map(|(coord, _)| coord)
        .unwrap_or_else(|| panic!("there is no {color} king on the board"))
}

fn in_check_on(board: &Board, color: Color) -> bool {
    movegen::is_attacked(board, king_square(board, color), color.opposite())
}

#[cfg(test)]
mod test_helpers {
    use super::*;

    pub fn at(square: &str) -> Coordinate {
        square.parse().expect("asserted square is invalid")
    }

    pub fn piece(square: &str, kind: PieceKind, color: Color) -> (Coordinate, Piece) {
        (at(square), Piece::new(kind, color))
    }

    pub fn assert_piece(game: &ChessMatch, square: &str, kind: PieceKind, color: Color) {
        let found = game.piece_at(at(square));
        assert!(
            found.is_some_and(|p| p.kind == kind && p.color == color),
            "Expected {color:?} {kind:?} at {square}, found {found:?}"
        );
    }

    pub fn assert_empty(game: &ChessMatch, square: &str) {
        let found = game.piece_at(at(square));
        assert!(found.is_none(), "Expected empty at {square}, found {found:?}");
    }
}
