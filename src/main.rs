use std::process::ExitCode;

use clap::arg;
use clap::command;
use tracing_subscriber::filter::LevelFilter;

use chess_referee::board::Coordinate;
use chess_referee::board::CoordParseError;
use chess_referee::console;
use chess_referee::game::{ChessMatch, MatchState, MoveError, PromotionError};
use chess_referee::piece::PieceKind;

fn main() -> ExitCode {
    let matches = command!()
        .arg(arg!(
            -d --debug "Turn debugging information on"
        ))
        .arg(
            arg!(
            -m --moves <moves> "Moves to play before the first prompt, e.g. e2e4 e7e5"
                    )
            .num_args(1..)
            .value_parser(clap::value_parser!(String)),
        )
        .get_matches();

    init_logging(matches.get_flag("debug"));

    let mut game = ChessMatch::new();
    let scripted = matches
        .get_many::<String>("moves")
        .unwrap_or_default()
        .filter(|&v| !v.is_empty())
        .collect::<Vec<_>>();
    for notation in scripted {
        if let Err(err) = play_scripted_move(&mut game, notation) {
            eprintln!("cannot play {notation}: {err}");
            return ExitCode::FAILURE;
        }
    }

    if let Err(err) = console::run_interactive_match(&mut game) {
        eprintln!("terminal failure: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Diagnostics go to stderr so they do not tear the board rendering.
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, thiserror::Error)]
enum ScriptError {
    #[error("moves are written like e2e4, or a7a8q when promoting")]
    Malformed,
    #[error("{0}")]
    Square(#[from] CoordParseError),
    #[error("{0}")]
    Move(#[from] MoveError),
    #[error("{0}")]
    Promotion(#[from] PromotionError),
}

/// Plays one move in long algebraic notation. A trailing letter picks the
/// promoted piece; a promoting move without one gets a queen.
fn play_scripted_move(game: &mut ChessMatch, notation: &str) -> Result<(), ScriptError> {
    let (Some(from), Some(to)) = (notation.get(0..2), notation.get(2..4)) else {
        return Err(ScriptError::Malformed);
    };
    let from: Coordinate = from.parse()?;
    let to: Coordinate = to.parse()?;
    let promotion = match notation.get(4..) {
        None | Some("") => None,
        Some("q") | Some("Q") => Some(PieceKind::Queen),
        Some("r") | Some("R") => Some(PieceKind::Rook),
        Some("b") | Some("B") => Some(PieceKind::Bishop),
        Some("n") | Some("N") => Some(PieceKind::Knight),
        Some(_) => return Err(ScriptError::Malformed),
    };

    game.perform_move(from, to)?;
    if game.state() == MatchState::PromotionPending {
        game.choose_promotion(promotion.unwrap_or(PieceKind::Queen))?;
    } else if promotion.is_some() {
        return Err(ScriptError::Malformed);
    }
    Ok(())
}
