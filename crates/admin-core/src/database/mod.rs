//! # Persistence Gateway
//!
//! Pooled SQLite handle shared by the agent registry, call ledger and
//! settings store. Every component holds a clone of [`Database`]; the pool is
//! bounded by `database.max_connections` and each statement checks a
//! connection out only for its own duration.
//!
//! Multi-statement writes go through `pool.begin()`. A transaction that is
//! dropped without `commit()` rolls back and returns its connection to the
//! pool, so early returns via `?` never leak a connection or a partial write.

pub mod rows;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, error, info, warn};

use crate::config::DatabaseConfig;
use crate::{Error, Result};

pub use rows::{DbAgent, DbAgentSkill, DbCall, DbSetting};

fn is_in_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

const SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

/// Call center database handle
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the configured database and apply the schema.
    ///
    /// An in-memory URL gets the same single pinned connection as
    /// [`Database::connect_in_memory`], whatever `max_connections` says.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("🗄️ Opening call center database at {}", config.url);

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        if is_in_memory_url(&config.url) {
            if config.max_connections > 1 {
                warn!(
                    "In-memory database URL {} is limited to one connection (configured {})",
                    config.url, config.max_connections
                );
            }
            return Self::pinned(options).await;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.initialize_schema().await?;

        info!(
            "✅ Database ready (pool size {})",
            config.max_connections
        );
        Ok(database)
    }

    /// In-memory database for demos and tests
    pub async fn connect_in_memory() -> Result<Self> {
        info!("🗄️ Creating in-memory call center database");

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        Self::pinned(options).await
    }

    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that never expires.
    async fn pinned(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.initialize_schema().await?;
        Ok(database)
    }

    /// Wrap an existing pool (schema is applied)
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let database = Self { pool };
        database.initialize_schema().await?;
        Ok(database)
    }

    async fn initialize_schema(&self) -> Result<()> {
        debug!("📋 Applying call center schema");
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that a pooled connection can be acquired and used
    pub async fn health_check(&self) -> Result<()> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => {
                debug!("💚 Database health check passed");
                Ok(())
            }
            Err(e) => {
                error!("❌ Database health check failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let db = Database::connect_in_memory().await.unwrap();
        db.health_check().await.unwrap();

        // Schema application is idempotent
        db.initialize_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_pool_fails_health_check() {
        let db = Database::connect_in_memory().await.unwrap();
        db.close().await;
        assert!(db.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_url_is_pinned_to_one_connection() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 4,
            acquire_timeout_secs: 5,
        };

        let db = Database::connect(&config).await.unwrap();
        assert_eq!(db.pool().options().get_max_connections(), 1);

        // Every query sees the schema applied at connect time
        for _ in 0..4 {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents")
                .fetch_one(db.pool())
                .await
                .unwrap();
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_in_memory_url_detection() {
        assert!(is_in_memory_url("sqlite::memory:"));
        assert!(is_in_memory_url("sqlite://shared?mode=memory&cache=shared"));
        assert!(!is_in_memory_url("sqlite://callcenter.db?mode=rwc"));
    }

    #[tokio::test]
    async fn test_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.path().join("cc.db").display()),
            max_connections: 2,
            acquire_timeout_secs: 5,
        };

        let db = Database::connect(&config).await.unwrap();
        db.health_check().await.unwrap();
    }
}
