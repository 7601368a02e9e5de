use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the relational store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the single connection pool shared by every request task
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the pool. Called once at startup; the pool is then handed to the store.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        url::Url::parse(&config.url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unparseable_url() {
        let config = DatabaseConfig {
            url: "not a url".to_string(),
            max_connections: 1,
            connection_timeout: 1,
        };
        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidDatabaseUrl));
    }
}
