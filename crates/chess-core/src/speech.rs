//! Spoken form of LAN moves.

use crate::pieces::PieceName;

/// Convert a LAN move to a phrase for text-to-speech.
///
/// ```
/// use chess_core::speech::lan_to_speech;
///
/// assert_eq!(lan_to_speech("Ng1-f3"), "Knight from g1 to f3");
/// assert_eq!(lan_to_speech("Bc4xf7+"), "Bishop from c4 captures f7 check");
/// assert_eq!(lan_to_speech("e7-e8=Q"), "Pawn from e7 to e8 Queen");
/// assert_eq!(lan_to_speech("O-O-O#"), "Long castle check");
/// ```
///
/// Checkmate is spoken as "check" too.
pub fn lan_to_speech(lan: &str) -> String {
    let is_check = lan.ends_with('+') || lan.ends_with('#');
    let lan = if is_check { &lan[..lan.len() - 1] } else { lan };

    if lan.starts_with("O-O") {
        let side = if lan == "O-O-O" { "Long" } else { "Short" };
        return format!("{side} castle{}", if is_check { " check" } else { "" });
    }

    let mut out = String::new();
    let rest = match lan.chars().next().and_then(PieceName::from_letter) {
        Some(piece) => {
            out.push_str(piece.display_name());
            &lan[1..]
        }
        None => {
            out.push_str("Pawn");
            lan
        }
    };

    out.push_str(" from ");
    out.push_str(rest.get(0..2).unwrap_or(rest));

    let capture = rest.as_bytes().get(2) == Some(&b'x');
    out.push_str(if capture { " captures " } else { " to " });
    out.push_str(rest.get(3..5).unwrap_or(""));

    if let Some(promotion) = rest.chars().last().and_then(PieceName::from_letter) {
        out.push(' ');
        out.push_str(promotion.display_name());
    }

    if is_check {
        out.push_str(" check");
    }
    out
}
