//! Applies moves to stored sessions and takes the engine's turns.

use std::time::Duration;

use chess_core::speech::lan_to_speech;
use chess_core::{classify_outcome, Color, Game, GameOutcome};
use tracing::info;

use crate::db::{SessionStore, User};
use crate::engine::MoveSource;
use crate::error::AppError;

pub struct Mediator<E, S> {
    engine: E,
    store: S,
    think_time: Duration,
}

impl<E: MoveSource, S: SessionStore> Mediator<E, S> {
    pub fn new(engine: E, store: S, think_time: Duration) -> Self {
        Self { engine, store, think_time }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Begin a fresh game for the session, replacing any game it had.
    pub async fn start_game(&self, session_id: &str, color: Color) -> Result<(), AppError> {
        if self.store.exists(session_id).await? {
            self.store.delete(session_id).await?;
        }
        self.store.create(session_id, &Game::new(), color).await?;
        info!(session_id, ?color, "Game started");
        Ok(())
    }

    pub async fn user(&self, session_id: &str) -> Result<User, AppError> {
        self.store.get(session_id).await
    }

    /// Play a LAN (or any algebraic) move for the session. Returns `false`
    /// and leaves the stored game untouched when the move is rejected or the
    /// game is already over.
    pub async fn play_lan(&self, session_id: &str, lan: &str) -> Result<bool, AppError> {
        let User { mut game, .. } = self.store.get(session_id).await?;
        if game.is_game_over(true) || game.push_algebraic(lan).is_err() {
            return Ok(false);
        }
        self.store.update(session_id, &game).await?;
        Ok(true)
    }

    /// Let the engine move and return the move as speech.
    pub async fn play_engine_move_and_speak(&self, session_id: &str) -> Result<String, AppError> {
        let User { mut game, .. } = self.store.get(session_id).await?;
        let m = self.engine.best_move(&game, self.think_time).await?;
        let lan = game.lan(&m);
        game.push(m);
        self.store.update(session_id, &game).await?;
        Ok(lan_to_speech(&lan))
    }

    pub async fn outcome(&self, session_id: &str) -> Result<GameOutcome, AppError> {
        let user = self.store.get(session_id).await?;
        Ok(classify_outcome(&user.game, user.color))
    }

    pub async fn end_game(&self, session_id: &str) -> Result<(), AppError> {
        self.store.delete(session_id).await?;
        info!(session_id, "Game ended");
        Ok(())
    }
}
