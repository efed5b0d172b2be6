// Store connection parameters from the environment

use sqlx::postgres::PgConnectOptions;
use std::time::Duration;

/// Connection parameters for the task store.
///
/// Read from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
/// Missing credentials are not an error here: the pool is built lazily and
/// the first query surfaces the failure instead.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Upper bound on concurrent physical connections.
    pub max_connections: u32,
    /// Idle connections are recycled after this long.
    pub idle_timeout: Duration,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("DB_HOST", "localhost"),
            port: std::env::var("DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            user: env_or("DB_USER", "postgres"),
            password: env_or("DB_PASSWORD", ""),
            database: env_or("DB_NAME", "tasks"),
            max_connections: 10,
            idle_timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
