//! Database connection and pool management.
//!
//! The schema is owned by the host application — this crate runs no
//! migrations and must never alter tables, only rows.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

// Operator tooling, not a service: a couple of connections is plenty.
const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool for the host application's Postgres database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database at the given URL.
    ///
    /// Fails fast: a short acquire timeout so `doctor` and one-shot
    /// commands don't hang on an unreachable server.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!("Connected to host database");
        Ok(Self { pool })
    }

    /// Cheap reachability check for `doctor`.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
