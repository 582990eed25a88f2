// region:    --- Imports
use crate::config::StoreConfig;
use crate::error::AuctionError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};
// endregion: --- Imports

pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
    retry_attempts: u32,
    retry_backoff: std::time::Duration,
}

impl DatabaseManager {
    /// Connects a pool using the store settings.
    pub async fn connect(database_url: &str, config: &StoreConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(database_url)
            .await?;
        info!(
            "{:<12} --> Postgres pool ready (max {} connections)",
            "Database", config.max_connections
        );
        Ok(Self::from_pool(pool, config))
    }

    pub fn from_pool(pool: PgPool, config: &StoreConfig) -> Self {
        Self {
            pool: Arc::new(pool),
            retry_attempts: config.retry_attempts.max(1),
            retry_backoff: config.retry_backoff,
        }
    }

    /// Runs `f` inside a transaction: commit on `Ok`, rollback on `Err`.
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Re-runs `op` with exponential backoff while it fails with a transient
    /// storage error. Domain errors are returned on the first attempt.
    pub async fn with_retry<T, F, Fut>(&self, name: &str, mut op: F) -> Result<T, AuctionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AuctionError>>,
    {
        let mut attempt = 1;
        let mut backoff = self.retry_backoff;
        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.retry_attempts => {
                    warn!(
                        "{:<12} --> {} failed (attempt {}/{}), retrying in {:?}: {}",
                        "Database", name, attempt, self.retry_attempts, backoff, e
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                    backoff *= 2;
                }
                result => return result,
            }
        }
    }

    /// Creates the schema if it does not exist yet. Existing data is kept.
    pub async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        let create_schema_sql = include_str!("../../sql/01-create-schema.sql");
        self.execute_multi_query(create_schema_sql).await?;
        Ok(())
    }

    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
