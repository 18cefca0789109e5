use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::health::ports::DatabaseProber;
use crate::domain::health::ports::ProbeError;

/// Connectivity probe backed by the shared connection pool.
pub struct PostgresProber {
    pool: PgPool,
}

impl PostgresProber {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseProber for PostgresProber {
    async fn probe(&self) -> Result<(), ProbeError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| ProbeError(e.to_string()))
    }
}
