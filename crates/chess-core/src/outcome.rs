//! Game outcome from the player's point of view.

use std::fmt;

use shakmaty::Color;

use crate::game::{Game, GameResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
    Unknown,
}

impl DrawReason {
    pub fn description(self) -> &'static str {
        match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::FiftyMoveRule => "fifty move rule",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::Unknown => "unknown reason",
        }
    }
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Ongoing,
    Win,
    Loss,
    Draw(DrawReason),
}

impl GameOutcome {
    pub fn is_over(self) -> bool {
        self != GameOutcome::Ongoing
    }
}

fn draw_reason(game: &Game) -> DrawReason {
    if game.is_stalemate() {
        DrawReason::Stalemate
    } else if game.is_insufficient_material() {
        DrawReason::InsufficientMaterial
    } else if game.can_claim_fifty_moves() {
        DrawReason::FiftyMoveRule
    } else if game.can_claim_threefold_repetition() {
        DrawReason::ThreefoldRepetition
    } else {
        DrawReason::Unknown
    }
}

/// Classify the game for the side `player` plays. Claimable draws count as
/// finished. Call again after every move, whoever made it.
pub fn classify_outcome(game: &Game, player: Color) -> GameOutcome {
    let winner = match game.result(true) {
        GameResult::Ongoing => return GameOutcome::Ongoing,
        GameResult::Draw => return GameOutcome::Draw(draw_reason(game)),
        GameResult::WhiteWins => Color::White,
        GameResult::BlackWins => Color::Black,
    };
    if winner == player {
        GameOutcome::Win
    } else {
        GameOutcome::Loss
    }
}
