use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine_path: String,
    /// Engine thinking time per reply move
    pub engine_think_ms: u64,
    /// Extra time allowed on top of the think time before the engine is
    /// considered hung
    pub engine_grace_ms: u64,
    /// Postgres URL; sessions are kept in memory when unset
    pub database_url: Option<String>,
    pub session_ttl_hours: i64,
    pub session_prune_interval_secs: u64,
}

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", 8000),
            engine_path: env::var("ENGINE_PATH").unwrap_or_else(|_| "stockfish".to_string()),
            engine_think_ms: parsed("ENGINE_THINK_MS", 100),
            engine_grace_ms: parsed("ENGINE_GRACE_MS", 2000),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            session_ttl_hours: parsed("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS),
            session_prune_interval_secs: parsed("SESSION_PRUNE_INTERVAL_SECS", 600),
        }
    }

    pub fn engine_think_time(&self) -> Duration {
        Duration::from_millis(self.engine_think_ms)
    }

    pub fn engine_grace(&self) -> Duration {
        Duration::from_millis(self.engine_grace_ms)
    }

    /// Out-of-range values fall back to the default TTL.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.session_ttl_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn session_prune_interval(&self) -> Duration {
        Duration::from_secs(self.session_prune_interval_secs.max(1))
    }
}
