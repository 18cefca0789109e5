use async_trait::async_trait;
use thiserror::Error;

/// Error returned by a failed connectivity probe.
#[derive(Debug, Clone, Error)]
#[error("Database probe failed: {0}")]
pub struct ProbeError(pub String);

/// One-round-trip connectivity check against the backing database.
#[async_trait]
pub trait DatabaseProber: Send + Sync + 'static {
    async fn probe(&self) -> Result<(), ProbeError>;
}
