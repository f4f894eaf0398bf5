/// PostgreSQL connection pool
///
/// One `PgPool` is created at startup and shared by every request handler.
/// Creation fails fast when the database is unreachable.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Pool settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Connections kept warm while idle
    pub min_connections: u32,

    /// How long a request waits for a free connection (seconds)
    pub acquire_timeout_seconds: u64,

    /// Idle connections are closed after this long (seconds)
    pub idle_timeout_seconds: Option<u64>,

    /// Connections are recycled after this long (seconds)
    pub max_lifetime_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
        }
    }
}

/// Opens the pool and verifies the database answers
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(config.idle_timeout_seconds.map(Duration::from_secs))
        .max_lifetime(config.max_lifetime_seconds.map(Duration::from_secs))
        .connect(&config.url)
        .await?;

    health_check(&pool).await?;

    info!("Database connection pool ready");
    Ok(pool)
}

/// Round-trips a trivial query
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;

    if one != 1 {
        return Err(sqlx::Error::Protocol(format!(
            "health check returned {}",
            one
        )));
    }

    debug!("Database health check passed");
    Ok(())
}

/// Snapshot of pool usage, reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub in_use: u32,
}

pub fn pool_stats(pool: &PgPool) -> PoolStats {
    let size = pool.size();
    let idle = pool.num_idle() as u32;

    PoolStats {
        size,
        idle,
        in_use: size.saturating_sub(idle),
    }
}

/// Waits for checked-out connections to return, then closes the pool
pub async fn close_pool(pool: PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
}
