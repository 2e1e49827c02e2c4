//! An interactive terminal front end over [`ChessMatch`].
//!
//! The loop reads squares from the player, shows the legal destinations of
//! the selected piece and replays rule errors as messages instead of
//! aborting. It runs on plain readers and writers so tests can drive a
//! whole match from a string script.

use std::io::{self, BufRead, Write};

use crate::board::Coordinate;
use crate::game::{ChessMatch, MatchState};
use crate::piece::PieceKind;

mod render;

pub use render::{render_board, render_match};

/// Runs `game` on the process terminal until checkmate or end of input.
pub fn run_interactive_match(game: &mut ChessMatch) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_match(&mut stdin.lock(), &mut stdout.lock(), game)
}

/// Drives `game` over the given reader and writer until checkmate or end
/// of input. A match handed over with a promotion already pending is
/// prompted for the choice before any move.
pub fn run_match(
    input: &mut impl BufRead,
    output: &mut impl Write,
    game: &mut ChessMatch,
) -> io::Result<()> {
    let mut notice: Option<String> = None;
    while game.state() != MatchState::Checkmate {
        clear_screen(output)?;
        render_match(output, game)?;
        if let Some(message) = notice.take() {
            writeln!(output)?;
            writeln!(output, "{message}")?;
        }
        if game.state() == MatchState::PromotionPending {
            prompt_promotion(input, output, game)?;
            continue;
        }

        let Some(source) = prompt_coordinate(input, output, "Source: ")? else {
            return Ok(());
        };
        let moves = match game.possible_moves(source) {
            Ok(moves) => moves,
            Err(err) => {
                notice = Some(err.to_string());
                continue;
            }
        };

        clear_screen(output)?;
        render_board(output, &game.pieces(), Some(&moves))?;
        writeln!(output)?;
        let Some(target) = prompt_coordinate(input, output, "Target: ")? else {
            return Ok(());
        };
        if let Err(err) = game.perform_move(source, target) {
            notice = Some(err.to_string());
        }
    }

    clear_screen(output)?;
    render_match(output, game)
}

fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    write!(w, "\x1B[2J\x1B[H")
}

/// Prompts until a parsable square arrives. `None` means end of input.
fn prompt_coordinate(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
) -> io::Result<Option<Coordinate>> {
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match text.parse() {
            Ok(coordinate) => return Ok(Some(coordinate)),
            Err(err) => writeln!(output, "Invalid square: {err}")?,
        }
    }
}

/// Prompts for the promoted kind. An empty line, and therefore end of
/// input as well, picks the queen.
fn prompt_promotion(
    input: &mut impl BufRead,
    output: &mut impl Write,
    game: &mut ChessMatch,
) -> io::Result<()> {
    loop {
        write!(output, "Promote to (B/N/R/Q, default Q): ")?;
        output.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        match parse_promotion_kind(line.trim()) {
            Some(kind) => {
                game.choose_promotion(kind)
                    .expect("promotion parser only yields promotable kinds");
                return Ok(());
            }
            None => writeln!(output, "Valid letters are B, N, R and Q")?,
        }
    }
}

fn parse_promotion_kind(text: &str) -> Option<PieceKind> {
    match text.to_ascii_uppercase().as_str() {
        "" | "Q" => Some(PieceKind::Queen),
        "R" => Some(PieceKind::Rook),
        "B" => Some(PieceKind::Bishop),
        "N" => Some(PieceKind::Knight),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Color, Piece};

    fn at(square: &str) -> Coordinate {
        square.parse().expect("test square is invalid")
    }

    fn run_script(game: &mut ChessMatch, script: &str) -> String {
        let mut input = io::Cursor::new(script);
        let mut output = Vec::new();
        run_match(&mut input, &mut output, game).expect("scripted match should not fail");
        String::from_utf8(output).expect("output should be valid UTF-8")
    }

    fn promotion_game() -> ChessMatch {
        ChessMatch::from_position(
            [
                (at("e1"), Piece::new(PieceKind::King, Color::White)),
                (at("b7"), Piece::new(PieceKind::Pawn, Color::White)),
                (at("e4"), Piece::new(PieceKind::King, Color::Black)),
            ],
            Color::White,
        )
    }

    #[test]
    fn scripted_fools_mate_runs_to_checkmate() {
        let mut game = ChessMatch::new();
        let output = run_script(&mut game, "f2\nf3\ne7\ne5\ng2\ng4\nd8\nh4\n");

        assert!(game.in_checkmate());
        assert_eq!(game.winner(), Some(Color::Black));
        assert!(output.contains("CHECKMATE!"));
        assert!(output.contains("Winner: Black"));
    }

    #[test]
    fn unparsable_square_is_reported_and_prompted_again() {
        let mut game = ChessMatch::new();
        let output = run_script(&mut game, "zz\ne2\ne4\n");

        assert_eq!(game.turn(), 2);
        assert!(output.contains("Invalid square:"));
    }

    #[test]
    fn rule_errors_become_notices_on_the_next_screen() {
        let mut game = ChessMatch::new();
        let output = run_script(&mut game, "e2\ne5\ne2\ne4\n");

        assert_eq!(game.turn(), 2);
        assert!(output.contains("the piece on e2 cannot move to e5"));
    }

    #[test]
    fn selecting_an_empty_square_is_reported() {
        let mut game = ChessMatch::new();
        let output = run_script(&mut game, "e4\ne2\ne4\n");

        assert_eq!(game.turn(), 2);
        assert!(output.contains("there is no piece on e4"));
    }

    #[test]
    fn end_of_input_leaves_the_match_unfinished() {
        let mut game = ChessMatch::new();
        run_script(&mut game, "e2\ne4\n");

        assert_eq!(game.turn(), 2);
        assert!(!game.in_checkmate());
    }

    #[test]
    fn promotion_prompt_rejects_unknown_letters() {
        let mut game = promotion_game();
        let output = run_script(&mut game, "b7\nb8\nx\nn\n");

        assert!(output.contains("Valid letters are B, N, R and Q"));
        let promoted = game.piece_at(at("b8")).expect("b8 should be occupied");
        assert_eq!(promoted.kind, PieceKind::Knight);
        assert_eq!(promoted.color, Color::White);
    }

    #[test]
    fn promotion_prompt_defaults_to_queen() {
        let mut game = promotion_game();
        run_script(&mut game, "b7\nb8\n");

        let promoted = game.piece_at(at("b8")).expect("b8 should be occupied");
        assert_eq!(promoted.kind, PieceKind::Queen);
    }

    #[test]
    fn a_match_handed_over_mid_promotion_is_prompted_for_the_choice() {
        let mut game = promotion_game();
        game.perform_move(at("b7"), at("b8")).unwrap();
        assert_eq!(game.state(), MatchState::PromotionPending);

        let output = run_script(&mut game, "n\n");

        assert!(output.contains("Promote to"));
        let promoted = game.piece_at(at("b8")).expect("b8 should be occupied");
        assert_eq!(promoted.kind, PieceKind::Knight);
        assert_eq!(game.state(), MatchState::InProgress);
        assert_eq!(game.turn(), 2);
    }

    #[test]
    fn highlighted_destinations_are_rendered_between_prompts() {
        let mut game = ChessMatch::new();
        let output = run_script(&mut game, "e2\ne4\n");

        assert!(output.contains("\x1b[44m"));
        assert!(output.contains("Source: "));
        assert!(output.contains("Target: "));
    }
}
