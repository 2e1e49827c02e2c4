use std::fmt;

/// The two sides of a chess match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the other side.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// The six piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Returns the uppercase letter conventionally used for this kind.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }
}

/// A piece as pure data: kind, owner, and how often it has moved.
///
/// Pieces do not know where they stand. The board cell holding a piece is
/// its coordinate, and a captured piece keeps only its kind and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    move_count: u32,
}

impl Piece {
    /// Creates a piece that has not moved yet.
    #[inline]
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            move_count: 0,
        }
    }

    /// Number of completed moves this piece has made.
    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// True once the piece has moved at least once.
    ///
    /// Gates pawn double-steps and castling eligibility.
    #[inline]
    pub fn has_moved(&self) -> bool {
        self.move_count > 0
    }

    pub(crate) fn record_move(&mut self) {
        self.move_count += 1;
    }

    pub(crate) fn revert_move(&mut self) {
        self.move_count -= 1;
    }

    /// Display letter: uppercase for White, lowercase for Black.
    pub fn to_char(&self) -> char {
        let letter = self.kind.letter();
        match self.color {
            Color::White => letter,
            Color::Black => letter.to_ascii_lowercase(),
        }
    }
}
