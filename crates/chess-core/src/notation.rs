//! Algebraic move parsing, LAN and UCI rendering on top of shakmaty.
//!
//! The algebraic parser accepts plain SAN (`Nf3`, `exd5`, `e8=Q`) and the
//! fully-qualified long forms the rest of the crate produces (`Ng1-f3`,
//! `e7-e8=Q+`, `g1f3`), so every LAN string rendered here parses back
//! against the same position.

use shakmaty::san::{San, SanError};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Move, Position, Role};

/// Why an algebraic string did not resolve to a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraicError {
    /// Well-formed, but no legal move matches.
    #[error("illegal san: {0:?}")]
    Illegal(String),

    /// More than one legal move matches the pattern.
    #[error("ambiguous san: {0:?}")]
    Ambiguous(String),

    /// Not a recognizable move pattern.
    #[error("invalid san: {0:?}")]
    Invalid(String),
}

/// SAN spelling of a long form: `-` separators dropped, `0-0` read as `O-O`.
fn to_san_text(text: &str) -> String {
    if text.starts_with("O-O") {
        text.to_string()
    } else if text.starts_with("0-0") {
        text.replace('0', "O")
    } else {
        text.replace('-', "")
    }
}

/// `San::to_move`, except that a missing or extra `x` on a piece move (or a
/// pawn move with its file given) still finds the move.
fn san_to_move(pos: &Chess, san: San) -> Result<Move, SanError> {
    match san.to_move(pos) {
        Err(SanError::IllegalSan) => match san {
            San::Normal { role, file, rank, capture, to, promotion } if role != Role::Pawn || file.is_some() => {
                San::Normal { role, file, rank, capture: !capture, to, promotion }.to_move(pos)
            }
            _ => Err(SanError::IllegalSan),
        },
        res => res,
    }
}

/// Resolve an algebraic string against the legal moves of `pos`.
///
/// Coordinate forms (`g1f3`, `e1g1`, `e7e8q`) are tried first, then the
/// string is read as SAN with its `-` separators removed.
pub fn parse_algebraic(pos: &Chess, text: &str) -> Result<Move, AlgebraicError> {
    let text = text.trim();
    if let Some(m) = find_uci(pos, text) {
        return Ok(m);
    }

    let san = San::from_ascii(to_san_text(text).as_bytes())
        .map_err(|_| AlgebraicError::Invalid(text.to_string()))?;
    san_to_move(pos, san).map_err(|e| match e {
        SanError::AmbiguousSan => AlgebraicError::Ambiguous(text.to_string()),
        SanError::IllegalSan => AlgebraicError::Illegal(text.to_string()),
    })
}

/// Long algebraic notation of a legal move in `pos`, e.g. `Ng1-f3`, `e7-e8=Q+`.
pub fn lan(pos: &Chess, m: &Move) -> String {
    let mut out = match m {
        Move::Castle { king, rook } => {
            if rook.file() > king.file() { "O-O".to_string() } else { "O-O-O".to_string() }
        }
        Move::Normal { role, from, capture, to, promotion } => {
            let mut s = String::new();
            if *role != Role::Pawn {
                s.push(role.upper_char());
            }
            s.push_str(&from.to_string());
            s.push(if capture.is_some() { 'x' } else { '-' });
            s.push_str(&to.to_string());
            if let Some(p) = promotion {
                s.push('=');
                s.push(p.upper_char());
            }
            s
        }
        Move::EnPassant { from, to } => format!("{from}x{to}"),
        Move::Put { role, to } => format!("{}@{to}", role.upper_char()),
    };

    let mut after = pos.clone();
    after.play_unchecked(*m);
    if after.is_checkmate() {
        out.push('#');
    } else if after.is_check() {
        out.push('+');
    }
    out
}

/// UCI coordinate form with standard castling (`e1g1`).
pub fn uci(m: &Move) -> String {
    UciMove::from_standard(*m).to_string()
}

/// Find the legal move named by a lowercase coordinate string. Castles are
/// only found by the king's two-square move, not king takes rook.
pub fn find_uci(pos: &Chess, uci: &str) -> Option<Move> {
    if uci.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let uci = UciMove::from_ascii(uci.as_bytes()).ok()?;
    let m = uci.to_move(pos).ok()?;
    (UciMove::from_standard(m) == uci).then_some(m)
}
