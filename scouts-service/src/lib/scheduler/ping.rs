use std::sync::Arc;
use std::time::Duration;

use crate::domain::notify::models::NotifyLevel;
use crate::domain::notify::models::PingReport;
use crate::domain::notify::models::ProbeStatus;
use crate::domain::notify::ports::BotPort;
use crate::domain::notify::service::StatusNotifier;

/// Endpoints probed on every configured host.
const ENDPOINTS: [&str; 2] = ["ping_database", "ping_application"];

/// Periodic cross-service liveness check.
///
/// Probes every configured host over plain HTTP and reports the aggregate
/// through the status notifier.
pub struct PingJob<B>
where
    B: BotPort,
{
    client: reqwest::Client,
    hosts: Vec<String>,
    path_prefix: String,
    notifier: Arc<StatusNotifier<B>>,
}

impl<B> PingJob<B>
where
    B: BotPort,
{
    pub fn new(
        hosts: Vec<String>,
        path_prefix: String,
        timeout: Duration,
        notifier: Arc<StatusNotifier<B>>,
    ) -> anyhow::Result<Self> {
        // Per-call deadline: a hung downstream must not block future ticks
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            hosts,
            path_prefix,
            notifier,
        })
    }

    fn probe_url(&self, host: &str, endpoint: &str) -> String {
        format!(
            "http://{host}{}/v1/health_check/{endpoint}",
            self.path_prefix
        )
    }

    /// One scheduler tick.
    ///
    /// Each host × endpoint probe runs independently; one failure never
    /// aborts the rest. A notifier failure is handled here and reported
    /// best-effort, so the tick itself always completes.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut report = PingReport::new();

        for host in &self.hosts {
            for endpoint in ENDPOINTS {
                let url = self.probe_url(host, endpoint);
                let status = match self.client.get(&url).send().await {
                    Ok(response) if response.status() == reqwest::StatusCode::OK => {
                        tracing::info!(host = %host, endpoint, "Health check is successful");
                        ProbeStatus::Successful
                    }
                    Ok(response) => {
                        let code = response.status().as_u16();
                        tracing::error!(
                            host = %host,
                            endpoint,
                            code,
                            "Health check failed with status code"
                        );
                        ProbeStatus::FailedStatus { code }
                    }
                    Err(error) => {
                        tracing::error!(
                            host = %host,
                            endpoint,
                            url = %url,
                            error = %error,
                            "Health check failed"
                        );
                        ProbeStatus::FailedTransport {
                            url: url.clone(),
                            error: error.to_string(),
                        }
                    }
                };
                report.record(host, endpoint, status);
            }
        }

        if let Err(error) = self.notifier.send_ping_status(&report).await {
            tracing::error!(error = %error, "Failed to send ping status");
            self.notifier
                .send_traceback_message_safe(
                    &format!("Failed to send ping status: {error}"),
                    &format!("{error:?}"),
                    NotifyLevel::Error,
                )
                .await;
        }

        Ok(())
    }
}
