//! PostgreSQL pool construction shared by devcommunity binaries
//!
//! `DbConfig::from_env` reads `DATABASE_URL` plus optional `DB_*` sizing and
//! timeout overrides; `create_pool` connects, verifies the connection and
//! keeps the pool gauges in `metrics` fresh.

mod metrics;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

/// Upper bound applied to any pool size read from the environment
const MAX_POOL_CONNECTIONS: u32 = 100;

const METRICS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum DbConfigError {
    #[error("DATABASE_URL environment variable not set")]
    MissingUrl,

    #[error("{key} has invalid value '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct DbConfig {
    /// Label attached to pool metrics and logs
    pub service_name: String,
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Bound on the startup `SELECT 1` verification
    pub connect_timeout: Duration,
    /// Wait for a free connection before giving up
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("max_lifetime", &self.max_lifetime)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: "devcommunity".to_string(),
            database_url: String::new(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DbConfig {
    pub fn from_env(service_name: &str) -> Result<Self, DbConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or(DbConfigError::MissingUrl)?;

        let defaults = Self::default();
        let max_connections =
            env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?.clamp(1, MAX_POOL_CONNECTIONS);
        let min_connections = env_or("DB_MIN_CONNECTIONS", defaults.min_connections)?.min(max_connections);

        Ok(Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections,
            min_connections,
            connect_timeout: env_secs_or("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            acquire_timeout: env_secs_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout)?,
            idle_timeout: env_secs_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout)?,
            max_lifetime: env_secs_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime)?,
        })
    }

    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            connect_timeout_secs = self.connect_timeout.as_secs(),
            acquire_timeout_secs = self.acquire_timeout.as_secs(),
            idle_timeout_secs = self.idle_timeout.as_secs(),
            max_lifetime_secs = self.max_lifetime.as_secs(),
            "Database pool configuration"
        );
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .test_before_acquire(true)
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, DbConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DbConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn env_secs_or(key: &'static str, default: Duration) -> Result<Duration, DbConfigError> {
    env_or(key, default.as_secs()).map(Duration::from_secs)
}

/// Connect, verify with `SELECT 1`, and start the pool gauge refresher
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    let pool = config.pool_options().connect(&config.database_url).await?;

    verify_connection(&pool, &config).await?;
    info!(service = %config.service_name, "Database pool ready");

    spawn_metrics_refresh(pool.clone(), config.service_name);
    Ok(pool)
}

async fn verify_connection(pool: &PgPool, config: &DbConfig) -> Result<(), sqlx::Error> {
    let probe = sqlx::query("SELECT 1").execute(pool);

    match tokio::time::timeout(config.connect_timeout, probe).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => {
            error!(service = %config.service_name, error = %e, "Database verification failed");
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout.as_secs(),
                "Database verification timed out"
            );
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

fn spawn_metrics_refresh(pool: PgPool, service: String) {
    metrics::update_pool_metrics(&pool, &service);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_REFRESH_INTERVAL);
        loop {
            interval.tick().await;
            if pool.is_closed() {
                break;
            }
            metrics::update_pool_metrics(&pool, &service);
        }
    });
}
