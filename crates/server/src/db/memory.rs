use std::collections::HashMap;

use chess_core::{Color, Game, GameRecord};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{already_exists, not_found, SessionStore, User};
use crate::error::AppError;

struct Entry {
    record: GameRecord,
    color: Color,
    updated_at: DateTime<Utc>,
}

/// Sessions held in the process, for running without a database and for tests.
/// Games are kept in their stored form so loads replay them like Postgres does.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(&self, session_id: &str, game: &Game, color: Color) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(session_id) {
            return Err(already_exists(session_id));
        }
        entries.insert(
            session_id.to_string(),
            Entry { record: game.record(), color, updated_at: Utc::now() },
        );
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<User, AppError> {
        let entries = self.entries.read().await;
        let entry = entries.get(session_id).ok_or_else(not_found)?;
        Ok(User {
            game: Game::from_record(&entry.record)?,
            color: entry.color,
        })
    }

    async fn update(&self, session_id: &str, game: &Game) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(session_id).ok_or_else(not_found)?;
        entry.record = game.record();
        entry.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .await
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(not_found)
    }

    async fn exists(&self, session_id: &str) -> Result<bool, AppError> {
        Ok(self.entries.read().await.contains_key(session_id))
    }

    async fn delete_stale(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.updated_at >= older_than);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemorySessionStore::new();
        let mut game = Game::new();
        game.push_algebraic("e4").unwrap();
        store.create("abc", &game, Color::Black).await.unwrap();

        let user = store.get("abc").await.unwrap();
        assert_eq!(user.color, Color::Black);
        assert_eq!(user.game.uci_moves(), vec!["e2e4"]);
        assert!(store.exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let store = MemorySessionStore::new();
        store.create("abc", &Game::new(), Color::White).await.unwrap();
        let err = store.create("abc", &Game::new(), Color::White).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Entry with key abc already exists."));
    }

    #[tokio::test]
    async fn test_missing_session() {
        let store = MemorySessionStore::new();
        assert!(matches!(store.get("nope").await, Err(AppError::NotFound(msg)) if msg == "Entry not found."));
        assert!(matches!(store.update("nope", &Game::new()).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.delete("nope").await, Err(AppError::NotFound(_))));
        assert!(!store.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let store = MemorySessionStore::new();
        let mut game = Game::new();
        store.create("abc", &game, Color::White).await.unwrap();
        game.push_algebraic("d4").unwrap();
        store.update("abc", &game).await.unwrap();
        assert_eq!(store.get("abc").await.unwrap().game.uci_moves(), vec!["d2d4"]);

        store.delete("abc").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_stale() {
        let store = MemorySessionStore::new();
        store.create("old", &Game::new(), Color::White).await.unwrap();
        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        assert_eq!(store.delete_stale(Utc::now() - chrono::Duration::hours(1)).await.unwrap(), 0);
        assert_eq!(store.delete_stale(cutoff).await.unwrap(), 1);
        assert_eq!(store.len().await, 0);
    }
}
