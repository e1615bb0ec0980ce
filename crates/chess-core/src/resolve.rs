//! Resolvers: turn each shape of spoken move into a LAN string or a
//! classified failure against the current game.
//!
//! Only [`classify_san`] (and [`resolve_piece_and_square`], which goes
//! through it) tells ambiguous and invalid input apart from illegal moves.
//! The two-square and castle resolvers report a plain [`Resolution::Illegal`]
//! for all of them, and callers word their replies accordingly.

use crate::game::Game;
use crate::notation::AlgebraicError;
use crate::pieces::PieceName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Legal(String),
    Illegal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanResolution {
    Legal(String),
    Illegal,
    Ambiguous,
    Invalid,
}

/// Neither a piece nor a pawn was named.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no piece or pawn given for the move")]
pub struct MissingMover;

/// Resolve a move given as origin and destination squares.
///
/// Squares are expected lowercase. `piece` is only consulted as the promotion
/// piece when the plain coordinate move is not legal.
pub fn two_squares_to_lan(game: &Game, from: &str, to: &str, piece: Option<PieceName>) -> Resolution {
    let mut uci = format!("{from}{to}");
    if !game.is_legal_uci(&uci) {
        let Some(symbol) = piece.and_then(PieceName::san_symbol) else {
            return Resolution::Illegal;
        };
        uci.push(symbol);
    }

    match game.find_uci(&uci) {
        Some(m) => Resolution::Legal(game.lan(&m)),
        None => Resolution::Illegal,
    }
}

const SHORT_WORDS: [&str; 3] = ["short", "kingside", "king's side"];
const LONG_WORDS: [&str; 3] = ["long", "queenside", "queen's side"];

/// Pick a castling move from free text. A side named in the text wins over
/// legality of the other side; short is preferred when both or neither are
/// named.
pub fn castle_from_query_text(game: &Game, query_text: &str) -> Resolution {
    let text = query_text.to_lowercase();

    let short_castle = game.parse_algebraic("O-O").ok();
    let long_castle = game.parse_algebraic("O-O-O").ok();

    let go_short = SHORT_WORDS.iter().any(|w| text.contains(w));
    let go_long = LONG_WORDS.iter().any(|w| text.contains(w));

    let chosen = if go_short {
        short_castle
    } else if go_long {
        long_castle
    } else {
        short_castle.or(long_castle)
    };

    match chosen {
        Some(m) => Resolution::Legal(game.lan(&m)),
        None => Resolution::Illegal,
    }
}

/// Classify an algebraic string, long forms included.
pub fn classify_san(game: &Game, san: &str) -> SanResolution {
    match game.parse_algebraic(san) {
        Ok(m) => SanResolution::Legal(game.lan(&m)),
        Err(AlgebraicError::Illegal(_)) => SanResolution::Illegal,
        Err(AlgebraicError::Ambiguous(_)) => SanResolution::Ambiguous,
        Err(AlgebraicError::Invalid(_)) => SanResolution::Invalid,
    }
}

/// Build the SAN a "piece to square" request stands for. A pawn reaching the
/// first or eighth rank takes the promotion piece if one was given.
pub fn piece_and_square_san(mover: PieceName, square: &str, promotion: Option<PieceName>) -> String {
    match mover.letter() {
        Some(letter) => format!("{letter}{square}"),
        None => {
            let last_rank = square.ends_with('1') || square.ends_with('8');
            match promotion.and_then(PieceName::letter) {
                Some(letter) if last_rank => format!("{square}={letter}"),
                _ => square.to_string(),
            }
        }
    }
}

/// Resolve "knight to f3", "pawn to e8 queen" and the like.
///
/// `mover` is the named piece, [`PieceName::Pawn`] for pawn moves, or `None`
/// when the request named neither.
pub fn resolve_piece_and_square(
    game: &Game,
    mover: Option<PieceName>,
    square: &str,
    promotion: Option<PieceName>,
) -> Result<SanResolution, MissingMover> {
    let mover = mover.ok_or(MissingMover)?;
    let san = piece_and_square_san(mover, square, promotion);
    Ok(classify_san(game, &san))
}
