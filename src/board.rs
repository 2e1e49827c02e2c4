use std::fmt;
use std::str::FromStr;

use crate::piece::Piece;

/// A single square on the board, addressed by (row, column).
///
/// Both components are in 0-7 where:
/// - row 0 = rank 8 (Black's back rank), row 7 = rank 1
/// - column 0 = file 'a', column 7 = file 'h'
///
/// Walking rows top to bottom therefore visits ranks in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    /// Creates a new Coordinate if both components are valid (0-7).
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Coordinate { row, col })
        } else {
            None
        }
    }

    /// Returns the row (0-7, top to bottom).
    #[inline]
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Returns the column (0-7, left to right).
    #[inline]
    pub fn col(&self) -> u8 {
        self.col
    }

    /// Returns the file ('a'-'h') of this square.
    pub fn file(&self) -> char {
        (b'a' + self.col) as char
    }

    /// Returns the rank (1-8) of this square.
    pub fn rank(&self) -> u8 {
        8 - self.row
    }

    /// Returns the square `rows` down and `cols` right of this one, or
    /// `None` if that leaves the board.
    pub fn offset(&self, rows: i8, cols: i8) -> Option<Self> {
        let row = self.row as i8 + rows;
        let col = self.col as i8 + cols;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Coordinate {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }
}

/// Parse algebraic notation like "e4" into a Coordinate.
///
/// # Examples
/// ```
/// # use chess_referee::board::Coordinate;
/// let coord: Coordinate = "e4".parse().unwrap();
/// assert_eq!(coord.row(), 4);
/// assert_eq!(coord.col(), 4);
/// ```
impl FromStr for Coordinate {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file = chars
            .next()
            .ok_or(CoordParseError::WrongLength)?
            .to_ascii_lowercase();
        let rank = chars.next().ok_or(CoordParseError::WrongLength)?;
        if chars.next().is_some() {
            return Err(CoordParseError::WrongLength);
        }

        let rank = rank.to_digit(10).ok_or(CoordParseError::BadRank)?;

        if !('a'..='h').contains(&file) {
            return Err(CoordParseError::BadFile);
        }
        if !(1..=8).contains(&rank) {
            return Err(CoordParseError::BadRank);
        }

        Ok(Coordinate {
            row: 8 - rank as u8,
            col: file as u8 - b'a',
        })
    }
}

/// Display the square in algebraic notation (e.g., "e4").
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Error type for parsing square notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordParseError {
    /// Square notation must be exactly 2 characters
    WrongLength,
    /// File must be a letter from a-h
    BadFile,
    /// Rank must be a digit from 1-8
    BadRank,
}

impl fmt::Display for CoordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordParseError::WrongLength => write!(f, "square must be 2 characters (e.g., 'e4')"),
            CoordParseError::BadFile => write!(f, "file must be a-h"),
            CoordParseError::BadRank => write!(f, "rank must be 1-8"),
        }
    }
}

impl std::error::Error for CoordParseError {}

/// An 8x8 board holding at most one piece per square.
///
/// The `Coordinate` type is the bounds check: every reachable cell is a
/// valid square, so access never fails at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    grid: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// Creates a board with no pieces on it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the piece occupying `coord`, if any.
    #[inline]
    pub fn piece_at(&self, coord: Coordinate) -> Option<&Piece> {
        self.grid[coord.row() as usize][coord.col() as usize].as_ref()
    }

    /// Puts `piece` on `coord`.
    ///
    /// # Panics
    ///
    /// Panics if the square is already occupied. Callers clear the target
    /// first; a double placement means the board state is corrupt.
    pub fn place(&mut self, coord: Coordinate, piece: Piece) {
        let cell = self.cell_mut(coord);
        assert!(cell.is_none(), "square {coord} is already occupied");
        *cell = Some(piece);
    }

    /// Takes the piece off `coord`, returning it. Empty squares yield `None`.
    pub fn remove(&mut self, coord: Coordinate) -> Option<Piece> {
        self.cell_mut(coord).take()
    }

    /// Iterates over all occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Coordinate, Piece)> + '_ {
        (0..8u8).flat_map(move |row| {
            (0..8u8).filter_map(move |col| {
                let coord = Coordinate::new(row, col)?;
                let piece = self.grid[row as usize][col as usize]?;
                Some((coord, piece))
            })
        })
    }

    /// Copies the position out as a row-major matrix, row 0 first.
    pub fn to_matrix(&self) -> [[Option<Piece>; 8]; 8] {
        self.grid
    }

    fn cell_mut(&mut self, coord: Coordinate) -> &mut Option<Piece> {
        &mut self.grid[coord.row() as usize][coord.col() as usize]
    }
}
