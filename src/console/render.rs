use std::io::{self, Write};

use crate::board::Coordinate;
use crate::game::{ChessMatch, MatchState};
use crate::movegen::Reachability;
use crate::piece::{Color, Piece};

const HIGHLIGHT: &str = "\x1b[44m";
const RESET: &str = "\x1b[0m";

/// Render the position to any writer. Extracted for testability.
///
/// One line per row with its rank label, rank 8 first, one character per
/// piece (uppercase White, lowercase Black), `-` for empty squares, and a
/// closing file-label line. Squares in `highlights` get a colored
/// background.
pub fn render_board(
    w: &mut impl Write,
    pieces: &[[Option<Piece>; 8]; 8],
    highlights: Option<&Reachability>,
) -> io::Result<()> {
    for (row, cells) in pieces.iter().enumerate() {
        write!(w, "{} ", 8 - row)?;
        for (col, cell) in cells.iter().enumerate() {
            let symbol = cell.map_or('-', |piece| piece.to_char());
            let marked = highlights.is_some_and(|set| {
                Coordinate::new(row as u8, col as u8).is_some_and(|coord| set.contains(coord))
            });
            if marked {
                write!(w, "{HIGHLIGHT}{symbol}{RESET} ")?;
            } else {
                write!(w, "{symbol} ")?;
            }
        }
        writeln!(w)?;
    }
    writeln!(w, "  a b c d e f g h")?;
    Ok(())
}

/// Render the whole match: board, captured pieces, turn and status line.
pub fn render_match(w: &mut impl Write, game: &ChessMatch) -> io::Result<()> {
    render_board(w, &game.pieces(), None)?;
    writeln!(w)?;
    render_captured(w, game.captured_pieces())?;
    writeln!(w)?;
    writeln!(w, "Turn: {}", game.turn())?;

    match game.state() {
        MatchState::Checkmate => {
            writeln!(w, "CHECKMATE!")?;
            if let Some(winner) = game.winner() {
                writeln!(w, "Winner: {winner}")?;
            }
        }
        MatchState::PromotionPending => {
            writeln!(w, "Waiting for the promotion choice of {}", game.side_to_move())?;
        }
        MatchState::InProgress => {
            writeln!(w, "Waiting player: {}", game.side_to_move())?;
            if game.in_check() {
                writeln!(w, "CHECK!")?;
            }
        }
    }
    Ok(())
}

fn render_captured(w: &mut impl Write, captured: &[Piece]) -> io::Result<()> {
    writeln!(w, "Captured pieces:")?;
    for color in [Color::White, Color::Black] {
        let letters: Vec<String> = captured
            .iter()
            .filter(|piece| piece.color == color)
            .map(|piece| piece.to_char().to_string())
            .collect();
        writeln!(w, "{color}: [{}]", letters.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    fn board_to_string(game: &ChessMatch, highlights: Option<&Reachability>) -> String {
        let mut buf = Vec::new();
        render_board(&mut buf, &game.pieces(), highlights)
            .expect("rendering to buffer should succeed");
        String::from_utf8(buf).expect("output should be valid UTF-8")
    }

    fn match_to_string(game: &ChessMatch) -> String {
        let mut buf = Vec::new();
        render_match(&mut buf, game).expect("rendering to buffer should succeed");
        String::from_utf8(buf).expect("output should be valid UTF-8")
    }

    fn at(square: &str) -> Coordinate {
        square.parse().expect("test square is invalid")
    }

    #[test]
    fn initial_board_renders_both_back_ranks() {
        let output = board_to_string(&ChessMatch::new(), None);

        assert!(
            output.contains("8 r n b q k b n r"),
            "rank 8 should render Black's back rank, got:\n{output}"
        );
        assert!(
            output.contains("1 R N B Q K B N R"),
            "rank 1 should render White's back rank, got:\n{output}"
        );
        assert!(
            output.contains("4 - - - - - - - -"),
            "empty ranks should render dashes, got:\n{output}"
        );
        assert!(
            output.contains("  a b c d e f g h"),
            "output should end with file labels"
        );
    }

    #[test]
    fn board_without_highlights_has_no_ansi_codes() {
        let output = board_to_string(&ChessMatch::new(), None);
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn highlighted_squares_use_blue_background() {
        let game = ChessMatch::new();
        let moves = game.possible_moves(at("e2")).unwrap();
        let output = board_to_string(&game, Some(&moves));

        assert!(
            output.contains("\x1b[44m"),
            "possible moves should use a blue ANSI background"
        );
    }

    #[test]
    fn match_summary_shows_turn_and_waiting_player() {
        let output = match_to_string(&ChessMatch::new());

        assert!(output.contains("Turn: 1"));
        assert!(output.contains("Waiting player: White"));
        assert!(!output.contains("CHECK!"));
    }

    #[test]
    fn match_summary_lists_captured_pieces_by_color() {
        let mut game = ChessMatch::new();
        game.perform_move(at("e2"), at("e4")).unwrap();
        game.perform_move(at("d7"), at("d5")).unwrap();
        game.perform_move(at("e4"), at("d5")).unwrap();

        let output = match_to_string(&game);
        assert!(output.contains("Captured pieces:"));
        assert!(output.contains("Black: [p]"));
        assert!(output.contains("White: []"));
    }

    #[test]
    fn match_summary_announces_pending_promotion() {
        let mut game = ChessMatch::from_position(
            [
                (at("e1"), Piece::new(PieceKind::King, Color::White)),
                (at("b7"), Piece::new(PieceKind::Pawn, Color::White)),
                (at("e4"), Piece::new(PieceKind::King, Color::Black)),
            ],
            Color::White,
        );
        game.perform_move(at("b7"), at("b8")).unwrap();

        let output = match_to_string(&game);
        assert!(output.contains("Waiting for the promotion choice of White"));
    }

    #[test]
    fn match_summary_announces_check() {
        let game = ChessMatch::from_position(
            [
                (at("e1"), Piece::new(PieceKind::King, Color::White)),
                (at("e8"), Piece::new(PieceKind::Rook, Color::Black)),
                (at("h8"), Piece::new(PieceKind::King, Color::Black)),
            ],
            Color::White,
        );

        let output = match_to_string(&game);
        assert!(output.contains("CHECK!"));
    }

    #[test]
    fn match_summary_announces_winner_on_checkmate() {
        let mut game = ChessMatch::from_position(
            [
                (at("e1"), Piece::new(PieceKind::King, Color::White)),
                (at("a1"), Piece::new(PieceKind::Rook, Color::White)),
                (at("h8"), Piece::new(PieceKind::King, Color::Black)),
                (at("g7"), Piece::new(PieceKind::Pawn, Color::Black)),
                (at("h7"), Piece::new(PieceKind::Pawn, Color::Black)),
            ],
            Color::White,
        );
        game.perform_move(at("a1"), at("a8")).unwrap();

        let output = match_to_string(&game);
        assert!(output.contains("CHECKMATE!"));
        assert!(output.contains("Winner: White"));
    }
}
