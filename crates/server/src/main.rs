use std::sync::Arc;

use anyhow::Context;
use server::config::Config;
use server::db::{self, MemorySessionStore, PgSessionStore, SessionStore};
use server::engine::UciEngine;
use server::mediator::Mediator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    // The server cannot play without an engine
    let engine = match UciEngine::activate(&config.engine_path, config.engine_grace()).await {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Error while initializing engine from {}:\n{e}", config.engine_path);
            return Err(e.into());
        }
    };

    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::pool::create_pool(url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Running migrations...");
            db::pool::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;

            serve(&config, engine, PgSessionStore::new(pool)).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set - sessions are kept in memory");
            serve(&config, engine, MemorySessionStore::new()).await
        }
    }
}

async fn serve<S: SessionStore>(config: &Config, engine: UciEngine, store: S) -> anyhow::Result<()> {
    let mediator = Arc::new(Mediator::new(engine, store, config.engine_think_time()));

    // Prune idle sessions
    let pruner = tokio::spawn({
        let mediator = mediator.clone();
        let ttl = config.session_ttl();
        let mut interval = tokio::time::interval(config.session_prune_interval());
        async move {
            loop {
                interval.tick().await;
                let cutoff = chrono::Utc::now() - ttl;
                match mediator.store().delete_stale(cutoff).await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Pruned {} idle sessions", n),
                    Err(e) => tracing::warn!("Failed to prune idle sessions: {}", e),
                }
            }
        }
    });

    let app = server::app(mediator.clone());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pruner.abort();
    mediator.engine().shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
