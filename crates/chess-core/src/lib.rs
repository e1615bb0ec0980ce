//! Move resolution for spoken chess: turns loosely specified moves into
//! validated LAN against a game, speaks LAN back, and classifies results.

pub mod game;
pub mod notation;
pub mod outcome;
pub mod pieces;
pub mod resolve;
pub mod speech;

pub use game::{Game, GameError, GameRecord, GameResult};
pub use notation::AlgebraicError;
pub use outcome::{classify_outcome, DrawReason, GameOutcome};
pub use pieces::PieceName;
pub use resolve::{Resolution, SanResolution};

pub use shakmaty;
pub use shakmaty::{Color, Move};
