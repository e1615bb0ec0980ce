//! English piece names as spoken to the assistant, and their notation letters.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceName {
    King,
    Queen,
    Rook,
    Knight,
    Bishop,
    Pawn,
}

impl PieceName {
    /// Uppercase letter used in SAN/LAN. Pawns have none.
    pub fn letter(self) -> Option<char> {
        match self {
            PieceName::King => Some('K'),
            PieceName::Queen => Some('Q'),
            PieceName::Rook => Some('R'),
            PieceName::Knight => Some('N'),
            PieceName::Bishop => Some('B'),
            PieceName::Pawn => None,
        }
    }

    /// Lowercase letter used as the promotion suffix of a coordinate move.
    pub fn san_symbol(self) -> Option<char> {
        self.letter().map(|c| c.to_ascii_lowercase())
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'K' => Some(PieceName::King),
            'Q' => Some(PieceName::Queen),
            'R' => Some(PieceName::Rook),
            'N' => Some(PieceName::Knight),
            'B' => Some(PieceName::Bishop),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PieceName::King => "King",
            PieceName::Queen => "Queen",
            PieceName::Rook => "Rook",
            PieceName::Knight => "Knight",
            PieceName::Bishop => "Bishop",
            PieceName::Pawn => "Pawn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown piece name: {0}")]
pub struct UnknownPiece(pub String);

impl FromStr for PieceName {
    type Err = UnknownPiece;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "king" => Ok(PieceName::King),
            "queen" => Ok(PieceName::Queen),
            "rook" => Ok(PieceName::Rook),
            "knight" => Ok(PieceName::Knight),
            "bishop" => Ok(PieceName::Bishop),
            "pawn" => Ok(PieceName::Pawn),
            _ => Err(UnknownPiece(s.to_string())),
        }
    }
}

impl fmt::Display for PieceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Knight".parse::<PieceName>(), Ok(PieceName::Knight));
        assert_eq!("QUEEN".parse::<PieceName>(), Ok(PieceName::Queen));
        assert_eq!(" pawn ".parse::<PieceName>(), Ok(PieceName::Pawn));
        assert!("dragon".parse::<PieceName>().is_err());
    }

    #[test]
    fn test_letters() {
        assert_eq!(PieceName::Knight.letter(), Some('N'));
        assert_eq!(PieceName::Knight.san_symbol(), Some('n'));
        assert_eq!(PieceName::Pawn.letter(), None);
        assert_eq!(PieceName::from_letter('B'), Some(PieceName::Bishop));
        assert_eq!(PieceName::from_letter('x'), None);
    }
}
