//! Session persistence: one game and color per assistant conversation.

pub mod memory;
pub mod pool;
pub mod sessions;

use std::future::Future;

use chess_core::{Color, Game};
use chrono::{DateTime, Utc};

use crate::error::AppError;

pub use memory::MemorySessionStore;
pub use sessions::PgSessionStore;

/// The player of a session.
#[derive(Debug, Clone)]
pub struct User {
    pub game: Game,
    pub color: Color,
}

pub(crate) fn already_exists(session_id: &str) -> AppError {
    AppError::Conflict(format!("Entry with key {session_id} already exists."))
}

pub(crate) fn not_found() -> AppError {
    AppError::NotFound("Entry not found.".to_string())
}

pub trait SessionStore: Send + Sync + 'static {
    /// Fails with `Conflict` when the session already has a game.
    fn create(
        &self,
        session_id: &str,
        game: &Game,
        color: Color,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Fails with `NotFound` for an unknown session.
    fn get(&self, session_id: &str) -> impl Future<Output = Result<User, AppError>> + Send;

    fn update(&self, session_id: &str, game: &Game) -> impl Future<Output = Result<(), AppError>> + Send;

    fn delete(&self, session_id: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    fn exists(&self, session_id: &str) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Remove sessions not touched since `older_than`; returns how many.
    fn delete_stale(&self, older_than: DateTime<Utc>) -> impl Future<Output = Result<u64, AppError>> + Send;
}
