use crate::board::{Board, Coordinate};
use crate::piece::{Piece, PieceKind};

/// Undo record for one applied move: every cell and counter it touched.
///
/// `captured` carries the square the occupant was taken from, which is
/// the move target except for en passant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AppliedMove {
    pub(crate) from: Coordinate,
    pub(crate) to: Coordinate,
    pub(crate) captured: Option<(Coordinate, Piece)>,
    pub(crate) rook_hop: Option<(Coordinate, Coordinate)>,
}

/// Moves the piece on `from` to `to`, with capture, castling, and en
/// passant side effects, and returns the record that undoes it exactly.
///
/// Expects a move that passed validation: the source square occupied and
/// the target geometrically reachable. Castling is recognized by the king
/// stepping two columns, en passant by a pawn changing column onto an
/// empty square.
///
/// # Panics
///
/// Panics when those expectations are violated; the board is then corrupt
/// and there is nothing sensible to roll back to.
pub(crate) fn apply(board: &mut Board, from: Coordinate, to: Coordinate) -> AppliedMove {
    let mut piece = board.remove(from).expect("apply source must hold a piece");
    piece.record_move();

    let mut captured = board.remove(to).map(|taken| (to, taken));

    // En passant: a pawn changing column onto an empty square takes the
    // pawn it passed, one row behind the target.
    if piece.kind == PieceKind::Pawn && from.col() != to.col() && captured.is_none() {
        let square = Coordinate::new(from.row(), to.col())
            .expect("en passant victim square is on the board");
        let victim = board
            .remove(square)
            .expect("en passant victim must be present");
        captured = Some((square, victim));
    }

    board.place(to, piece);

    // Castling: the king's two-column step pulls the rook to his far side.
    let mut rook_hop = None;
    if piece.kind == PieceKind::King {
        let cols = to.col() as i8 - from.col() as i8;
        if cols.abs() == 2 {
            let (rook_from, rook_to) = if cols > 0 {
                (from.offset(0, 3), from.offset(0, 1))
            } else {
                (from.offset(0, -4), from.offset(0, -1))
            };
            let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) else {
                panic!("castling squares must be on the board");
            };
            let mut rook = board
                .remove(rook_from)
                .expect("castling rook must be present");
            rook.record_move();
            board.place(rook_to, rook);
            rook_hop = Some((rook_from, rook_to));
        }
    }

    AppliedMove {
        from,
        to,
        captured,
        rook_hop,
    }
}

/// Exactly reverses a move applied by [`apply`].
///
/// Restores the moved piece, its move counter, any captured piece, and
/// the castled rook. Never touches anything the move did not touch.
pub(crate) fn undo(board: &mut Board, record: AppliedMove) {
    if let Some((rook_from, rook_to)) = record.rook_hop {
        let mut rook = board.remove(rook_to).expect("undo expects the castled rook");
        rook.revert_move();
        board.place(rook_from, rook);
    }

    let mut piece = board.remove(record.to).expect("undo expects the moved piece");
    piece.revert_move();
    board.place(record.from, piece);

    if let Some((square, taken)) = record.captured {
        board.place(square, taken);
    }
}
