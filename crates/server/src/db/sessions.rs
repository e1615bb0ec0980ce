use chess_core::{Color, Game, GameRecord};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use super::{already_exists, not_found, SessionStore, User};
use crate::error::AppError;

/// Sessions in Postgres. Moves are stored as a JSONB array of UCI strings and
/// replayed on load.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PgSessionStore {
    async fn create(&self, session_id: &str, game: &Game, color: Color) -> Result<(), AppError> {
        let record = game.record();
        let result = sqlx::query(
            "INSERT INTO chess_sessions (session_id, start_fen, moves, plays_white)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (session_id) DO NOTHING",
        )
        .bind(session_id)
        .bind(&record.start_fen)
        .bind(Json(&record.moves))
        .bind(color == Color::White)
        .execute(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(already_exists(session_id));
        }
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<User, AppError> {
        let row: Option<(Option<String>, Json<Vec<String>>, bool)> = sqlx::query_as(
            "SELECT start_fen, moves, plays_white FROM chess_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        let (start_fen, Json(moves), plays_white) = row.ok_or_else(not_found)?;
        let game = Game::from_record(&GameRecord { start_fen, moves })?;
        let color = if plays_white { Color::White } else { Color::Black };
        Ok(User { game, color })
    }

    async fn update(&self, session_id: &str, game: &Game) -> Result<(), AppError> {
        let record = game.record();
        let result = sqlx::query(
            "UPDATE chess_sessions SET start_fen = $1, moves = $2, updated_at = NOW()
             WHERE session_id = $3",
        )
        .bind(&record.start_fen)
        .bind(Json(&record.moves))
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM chess_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    async fn exists(&self, session_id: &str) -> Result<bool, AppError> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM chess_sessions WHERE session_id = $1)")
                .bind(session_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Sqlx)?;
        Ok(row.0)
    }

    async fn delete_stale(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM chess_sessions WHERE updated_at < $1")
            .bind(older_than)
            .execute(&self.pool)
            .await
            .map_err(AppError::Sqlx)?;
        Ok(result.rows_affected())
    }
}
