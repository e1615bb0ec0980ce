//! A game in progress: the current position plus the history needed for
//! repetition claims and for replaying the game from storage.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};

use crate::notation::{self, AlgebraicError};

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Recorded move {0:?} is not legal in the replayed position")]
    IllegalRecordedMove(String),
}

/// Storage form of a game: where it started and the UCI moves since.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub start_fen: Option<String>,
    pub moves: Vec<String>,
}

/// Result string in PGN terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Ongoing => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    start_fen: Option<String>,
    position: Chess,
    moves: Vec<Move>,
    /// Hash of every position reached, starting position first.
    history: Vec<Zobrist64>,
}

fn hash(pos: &Chess) -> Zobrist64 {
    pos.zobrist_hash(EnPassantMode::Legal)
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position.
    pub fn new() -> Self {
        Self::starting_at(None, Chess::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let invalid = |reason: String| GameError::InvalidFen { fen: fen.to_string(), reason };
        let setup: Fen = fen.parse().map_err(|e| invalid(format!("{e}")))?;
        let position: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Self::starting_at(Some(fen.to_string()), position))
    }

    /// Replay a stored game.
    pub fn from_record(record: &GameRecord) -> Result<Self, GameError> {
        let mut game = match &record.start_fen {
            Some(fen) => Self::from_fen(fen)?,
            None => Self::new(),
        };
        for uci in &record.moves {
            let m = game
                .find_uci(uci)
                .ok_or_else(|| GameError::IllegalRecordedMove(uci.clone()))?;
            game.push(m);
        }
        Ok(game)
    }

    fn starting_at(start_fen: Option<String>, position: Chess) -> Self {
        let history = vec![hash(&position)];
        Self { start_fen, position, moves: Vec::new(), history }
    }

    pub fn record(&self) -> GameRecord {
        GameRecord {
            start_fen: self.start_fen.clone(),
            moves: self.uci_moves(),
        }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn start_fen(&self) -> Option<&str> {
        self.start_fen.as_deref()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(notation::uci).collect()
    }

    pub fn find_uci(&self, uci: &str) -> Option<Move> {
        notation::find_uci(&self.position, uci)
    }

    pub fn is_legal_uci(&self, uci: &str) -> bool {
        self.find_uci(uci).is_some()
    }

    pub fn parse_algebraic(&self, san: &str) -> Result<Move, AlgebraicError> {
        notation::parse_algebraic(&self.position, san)
    }

    /// LAN of `m`, rendered against the position before it is played.
    pub fn lan(&self, m: &Move) -> String {
        notation::lan(&self.position, m)
    }

    /// Play a move. `m` must be legal in the current position, i.e. come from
    /// `find_uci`, `parse_algebraic` or the position's legal move list.
    pub fn push(&mut self, m: Move) {
        self.position.play_unchecked(m);
        self.history.push(hash(&self.position));
        self.moves.push(m);
    }

    pub fn push_algebraic(&mut self, san: &str) -> Result<Move, AlgebraicError> {
        let m = self.parse_algebraic(san)?;
        self.push(m);
        Ok(m)
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    fn occurrences(&self, key: Zobrist64) -> usize {
        self.history.iter().filter(|k| **k == key).count()
    }

    pub fn is_seventyfive_moves(&self) -> bool {
        self.position.halfmoves() >= 150 && !self.position.legal_moves().is_empty()
    }

    pub fn is_fivefold_repetition(&self) -> bool {
        self.history.last().is_some_and(|key| self.occurrences(*key) >= 5)
    }

    /// Fifty moves without a capture or pawn move have been played, or the
    /// next non-zeroing move completes them.
    pub fn can_claim_fifty_moves(&self) -> bool {
        let legals = self.position.legal_moves();
        let halfmoves = self.position.halfmoves();
        if halfmoves >= 100 && !legals.is_empty() {
            return true;
        }
        if halfmoves < 99 {
            return false;
        }
        legals.iter().filter(|m| !m.is_zeroing()).any(|m| {
            let mut after = self.position.clone();
            after.play_unchecked(*m);
            after.halfmoves() >= 100 && !after.legal_moves().is_empty()
        })
    }

    /// The current position occurred three times, or some legal move reaches
    /// a position that already occurred twice.
    pub fn can_claim_threefold_repetition(&self) -> bool {
        if self.history.last().is_some_and(|key| self.occurrences(*key) >= 3) {
            return true;
        }
        self.position.legal_moves().iter().any(|m| {
            let mut after = self.position.clone();
            after.play_unchecked(*m);
            self.occurrences(hash(&after)) >= 2
        })
    }

    pub fn can_claim_draw(&self) -> bool {
        self.can_claim_fifty_moves() || self.can_claim_threefold_repetition()
    }

    /// Game result; with `claim_draw` a claimable draw counts as a draw.
    pub fn result(&self, claim_draw: bool) -> GameResult {
        if self.is_checkmate() {
            return match self.turn() {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            };
        }
        if self.is_insufficient_material()
            || self.is_stalemate()
            || self.is_seventyfive_moves()
            || self.is_fivefold_repetition()
        {
            return GameResult::Draw;
        }
        if claim_draw && self.can_claim_draw() {
            return GameResult::Draw;
        }
        GameResult::Ongoing
    }

    pub fn is_game_over(&self, claim_draw: bool) -> bool {
        self.result(claim_draw) != GameResult::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut Game, sans: &[&str]) {
        for san in sans {
            game.push_algebraic(san).unwrap();
        }
    }

    #[test]
    fn test_record_round_trip_keeps_history() {
        let mut game = Game::new();
        play(&mut game, &["e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6", "O-O"]);
        let record = game.record();
        assert_eq!(record.moves.last().map(String::as_str), Some("e1g1"));

        let restored = Game::from_record(&record).unwrap();
        assert_eq!(restored.record(), record);
        assert_eq!(restored.turn(), Color::Black);
    }

    #[test]
    fn test_from_record_rejects_illegal_move() {
        let record = GameRecord { start_fen: None, moves: vec!["e2e5".into()] };
        assert!(matches!(
            Game::from_record(&record),
            Err(GameError::IllegalRecordedMove(m)) if m == "e2e5"
        ));
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(matches!(Game::from_fen("not a fen"), Err(GameError::InvalidFen { .. })));
    }

    #[test]
    fn test_result_checkmate() {
        let mut game = Game::new();
        play(&mut game, &["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(game.result(false), GameResult::BlackWins);
        assert_eq!(game.result(false).to_string(), "0-1");
        assert!(game.is_game_over(false));
        assert!(!game.is_legal_uci("e2e4"));
    }

    #[test]
    fn test_is_legal_uci() {
        let game = Game::new();
        assert!(game.is_legal_uci("g1f3"));
        assert!(!game.is_legal_uci("g1g3"));
        assert!(!game.is_game_over(true));
    }

    #[test]
    fn test_fifty_move_claim_needs_claim_flag() {
        let game = Game::from_fen("4k3/8/6r1/8/8/8/2R5/4K3 w - - 120 1").unwrap();
        assert!(game.can_claim_fifty_moves());
        assert_eq!(game.result(false), GameResult::Ongoing);
        assert_eq!(game.result(true), GameResult::Draw);
    }

    #[test]
    fn test_fifty_move_claim_on_next_move() {
        let game = Game::from_fen("4k3/8/6r1/8/8/8/2R5/4K3 w - - 99 80").unwrap();
        assert!(game.can_claim_fifty_moves());
        let game = Game::from_fen("4k3/8/6r1/8/8/8/2R5/4K3 w - - 98 80").unwrap();
        assert!(!game.can_claim_fifty_moves());
    }

    #[test]
    fn test_threefold_claim_before_third_occurrence() {
        let mut game = Game::new();
        play(&mut game, &["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6"]);
        assert!(!game.can_claim_threefold_repetition());
        play(&mut game, &["Ng1"]);
        // Ng8 would reach the starting position a third time.
        assert!(game.can_claim_threefold_repetition());
        assert_eq!(game.result(true), GameResult::Draw);
        assert_eq!(game.result(false), GameResult::Ongoing);
    }

    #[test]
    fn test_repetition_survives_storage() {
        let mut game = Game::new();
        play(&mut game, &["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"]);
        let restored = Game::from_record(&game.record()).unwrap();
        assert!(restored.can_claim_threefold_repetition());
    }
}
