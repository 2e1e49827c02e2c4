//! Geometric move generation.
//!
//! `reachable_from` answers "where may this piece move", including castling
//! and en passant; `attacks_from` answers "which squares does this piece
//! attack" and backs the check tests. The two differ for pawns (attacks
//! cover the diagonals whether or not they are occupied) and for kings
//! (castling is a move, not an attack).

use crate::board::{Board, Coordinate};
use crate::piece::{Color, Piece, PieceKind};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A set of squares, as an 8x8 boolean matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reachability {
    marks: [[bool; 8]; 8],
}

impl Reachability {
    pub(crate) fn mark(&mut self, coord: Coordinate) {
        self.marks[coord.row() as usize][coord.col() as usize] = true;
    }

    /// True if `coord` is in the set.
    #[inline]
    pub fn contains(&self, coord: Coordinate) -> bool {
        self.marks[coord.row() as usize][coord.col() as usize]
    }

    /// True if no square is marked.
    pub fn is_empty(&self) -> bool {
        !self.marks.iter().flatten().any(|&marked| marked)
    }

    /// Iterates over the marked squares in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..8u8).flat_map(move |row| {
            (0..8u8).filter_map(move |col| {
                let coord = Coordinate::new(row, col)?;
                self.contains(coord).then_some(coord)
            })
        })
    }
}

/// Computes the squares the piece on `origin` may move to, ignoring
/// whether the move would leave its own king attacked.
///
/// `en_passant` is the square of a pawn that just advanced two ranks, if
/// any; an adjacent enemy pawn may capture it onto the square it skipped.
/// An empty `origin` yields an empty set.
pub fn reachable_from(
    board: &Board,
    origin: Coordinate,
    en_passant: Option<Coordinate>,
) -> Reachability {
    let mut out = Reachability::default();
    let Some(&piece) = board.piece_at(origin) else {
        return out;
    };

    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, origin, piece, en_passant, &mut out),
        PieceKind::Knight => step_moves(board, origin, piece.color, &KNIGHT_OFFSETS, &mut out),
        PieceKind::Bishop => {
            sliding_moves(board, origin, piece.color, &BISHOP_DIRECTIONS, &mut out)
        }
        PieceKind::Rook => sliding_moves(board, origin, piece.color, &ROOK_DIRECTIONS, &mut out),
        PieceKind::Queen => sliding_moves(board, origin, piece.color, &QUEEN_DIRECTIONS, &mut out),
        PieceKind::King => {
            step_moves(board, origin, piece.color, &KING_OFFSETS, &mut out);
            castling_moves(board, origin, piece, &mut out);
        }
    }
    out
}

/// Computes the squares the piece on `origin` attacks.
///
/// Squares occupied by the piece's own side are not marked; the check
/// tests only ever ask about squares the attacker could capture on.
pub fn attacks_from(board: &Board, origin: Coordinate) -> Reachability {
    let mut out = Reachability::default();
    let Some(&piece) = board.piece_at(origin) else {
        return out;
    };

    match piece.kind {
        PieceKind::Pawn => {
            let forward = pawn_direction(piece.color);
            for cols in [-1, 1] {
                if let Some(target) = origin.offset(forward, cols) {
                    out.mark(target);
                }
            }
        }
        PieceKind::King => step_moves(board, origin, piece.color, &KING_OFFSETS, &mut out),
        PieceKind::Knight => step_moves(board, origin, piece.color, &KNIGHT_OFFSETS, &mut out),
        PieceKind::Bishop => {
            sliding_moves(board, origin, piece.color, &BISHOP_DIRECTIONS, &mut out)
        }
        PieceKind::Rook => sliding_moves(board, origin, piece.color, &ROOK_DIRECTIONS, &mut out),
        PieceKind::Queen => sliding_moves(board, origin, piece.color, &QUEEN_DIRECTIONS, &mut out),
    }
    out
}

/// True if any piece of `by` attacks `target`.
pub fn is_attacked(board: &Board, target: Coordinate, by: Color) -> bool {
    board
        .pieces()
        .filter(|(_, piece)| piece.color == by)
        .any(|(origin, _)| attacks_from(board, origin).contains(target))
}

fn pawn_direction(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

fn pawn_moves(
    board: &Board,
    origin: Coordinate,
    pawn: Piece,
    en_passant: Option<Coordinate>,
    out: &mut Reachability,
) {
    let forward = pawn_direction(pawn.color);

    // Single step, and the double step while the pawn has never moved
    if let Some(ahead) = origin.offset(forward, 0)
        && board.piece_at(ahead).is_none()
    {
        out.mark(ahead);
        if !pawn.has_moved()
            && let Some(two_ahead) = ahead.offset(forward, 0)
            && board.piece_at(two_ahead).is_none()
        {
            out.mark(two_ahead);
        }
    }

    // Diagonal captures
    for cols in [-1, 1] {
        if let Some(target) = origin.offset(forward, cols)
            && board.piece_at(target).is_some_and(|p| p.color != pawn.color)
        {
            out.mark(target);
        }
    }

    // En passant: capture the enemy pawn that just double-stepped past
    // this one, landing on the square it skipped.
    if let Some(vulnerable) = en_passant {
        for cols in [-1, 1] {
            if origin.offset(0, cols) == Some(vulnerable)
                && board
                    .piece_at(vulnerable)
                    .is_some_and(|p| p.color != pawn.color)
                && let Some(target) = vulnerable.offset(forward, 0)
            {
                out.mark(target);
            }
        }
    }
}

fn step_moves(
    board: &Board,
    origin: Coordinate,
    color: Color,
    offsets: &[(i8, i8)],
    out: &mut Reachability,
) {
    for &(rows, cols) in offsets {
        if let Some(target) = origin.offset(rows, cols) {
            match board.piece_at(target) {
                None => out.mark(target),
                Some(other) if other.color != color => out.mark(target),
                Some(_) => {}
            }
        }
    }
}

fn sliding_moves(
    board: &Board,
    origin: Coordinate,
    color: Color,
    directions: &[(i8, i8)],
    out: &mut Reachability,
) {
    for &(rows, cols) in directions {
        let mut cursor = origin.offset(rows, cols);
        while let Some(target) = cursor {
            match board.piece_at(target) {
                None => {
                    out.mark(target);
                    cursor = target.offset(rows, cols);
                }
                Some(other) => {
                    if other.color != color {
                        out.mark(target);
                    }
                    break;
                }
            }
        }
    }
}

/// Castling: king and rook unmoved, the squares between them empty, and
/// the king neither in check now nor passing through or landing on an
/// attacked square.
fn castling_moves(board: &Board, origin: Coordinate, king: Piece, out: &mut Reachability) {
    if king.has_moved() || is_attacked(board, origin, king.color.opposite()) {
        return;
    }
    castle_side(board, origin, king, 3, out);
    castle_side(board, origin, king, -4, out);
}

fn castle_side(
    board: &Board,
    origin: Coordinate,
    king: Piece,
    rook_cols: i8,
    out: &mut Reachability,
) {
    let Some(rook_square) = origin.offset(0, rook_cols) else {
        return;
    };
    let rook_ready = board
        .piece_at(rook_square)
        .is_some_and(|p| p.kind == PieceKind::Rook && p.color == king.color && !p.has_moved());
    if !rook_ready {
        return;
    }

    let step = rook_cols.signum();
    let mut cols = step;
    while cols != rook_cols {
        match origin.offset(0, cols) {
            Some(between) if board.piece_at(between).is_none() => {}
            _ => return,
        }
        cols += step;
    }

    let enemy = king.color.opposite();
    let (Some(transit), Some(landing)) = (origin.offset(0, step), origin.offset(0, 2 * step))
    else {
        return;
    };
    if is_attacked(board, transit, enemy) || is_attacked(board, landing, enemy) {
        return;
    }
    out.mark(landing);
}
