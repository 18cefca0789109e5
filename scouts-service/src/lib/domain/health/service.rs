use std::sync::Arc;

use crate::domain::health::ports::DatabaseProber;

/// Readiness checks exposed through the health endpoints.
pub struct HealthService<HP>
where
    HP: DatabaseProber,
{
    prober: Arc<HP>,
}

impl<HP> HealthService<HP>
where
    HP: DatabaseProber,
{
    pub fn new(prober: Arc<HP>) -> Self {
        Self { prober }
    }

    /// Run one database round trip. Failure is reported, not retried; the
    /// next probe will surface it again if it persists.
    pub async fn check_database(&self) -> bool {
        match self.prober.probe().await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(error = %error, "Database health check failed");
                false
            }
        }
    }
}
