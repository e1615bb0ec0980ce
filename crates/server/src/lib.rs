pub mod assistant;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod mediator;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use db::SessionStore;
use engine::MoveSource;
use mediator::Mediator;

/// Build the HTTP app around a mediator.
pub fn app<E: MoveSource, S: SessionStore>(mediator: Arc<Mediator<E, S>>) -> Router {
    Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Dialogflow fulfillment, also served at the root for older agents
        .route("/webhook", post(routes::webhook::webhook::<E, S>))
        .route("/", post(routes::webhook::webhook::<E, S>))
        // Shared state
        .layer(Extension(mediator))
        .layer(TraceLayer::new_for_http())
}
