use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::NaiveTime;
use chrono::Utc;

use crate::config::Config;
use crate::domain::notify::models::NotifyLevel;
use crate::domain::notify::ports::BotPort;
use crate::domain::notify::service::StatusNotifier;
use crate::outbound::telegram::TelegramBot;

pub mod db_dump;
pub mod ping;

/// When a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every `minutes`, first run one full period after startup.
    Interval { minutes: u64 },
    /// Daily at `hour`:00 UTC.
    Cron { hour: u32 },
}

impl Trigger {
    /// Time to sleep from `now` until the next firing.
    pub fn delay_until_next(&self, now: DateTime<Utc>) -> Duration {
        match *self {
            Trigger::Interval { minutes } => Duration::from_secs(minutes * 60),
            Trigger::Cron { hour } => {
                let fire_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
                let mut next = now.date_naive().and_time(fire_time).and_utc();
                if next <= now {
                    next += chrono::Duration::days(1);
                }
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }
}

/// One entry of the fixed job list: a strongly typed job behind a trigger.
pub struct JobRegistration<B>
where
    B: BotPort,
{
    pub name: &'static str,
    pub trigger: Trigger,
    pub kind: JobKind<B>,
}

/// The jobs this service knows how to run. There are exactly two; adding
/// another means adding a variant, not registering a callable.
pub enum JobKind<B>
where
    B: BotPort,
{
    Ping(ping::PingJob<B>),
    DbDump(db_dump::DbDumpJob<B>),
}

impl<B> JobKind<B>
where
    B: BotPort,
{
    pub async fn run(&self) -> anyhow::Result<()> {
        match self {
            JobKind::Ping(job) => job.run().await,
            JobKind::DbDump(job) => job.run().await,
        }
    }
}

/// Build the fixed registration list, evaluated once at startup.
pub fn registrations(
    config: &Config,
    notifier: Arc<StatusNotifier<TelegramBot>>,
    bot: Arc<TelegramBot>,
) -> anyhow::Result<Vec<JobRegistration<TelegramBot>>> {
    Ok(vec![
        JobRegistration {
            name: "ping",
            trigger: Trigger::Interval { minutes: 1 },
            kind: JobKind::Ping(ping::PingJob::new(
                config.ping.hosts.clone(),
                config.app.path_prefix.clone(),
                Duration::from_secs(config.ping.timeout_seconds),
                notifier,
            )?),
        },
        JobRegistration {
            name: "db_dump",
            trigger: Trigger::Cron { hour: 3 },
            kind: JobKind::DbDump(db_dump::DbDumpJob::new(
                config.database.clone(),
                config.app.name.clone(),
                config.telegram.db_dump_chat_id.clone(),
                bot,
            )),
        },
    ])
}

/// Drive every registered job on its own timer.
///
/// A failing run is logged and reported best-effort through the traceback
/// channel; it never stops the job's future ticks.
pub async fn run<B>(jobs: Vec<JobRegistration<B>>, notifier: Arc<StatusNotifier<B>>)
where
    B: BotPort,
{
    let mut handles = Vec::new();
    for registration in jobs {
        let notifier = Arc::clone(&notifier);
        handles.push(tokio::spawn(async move {
            loop {
                let delay = registration.trigger.delay_until_next(Utc::now());
                tokio::time::sleep(delay).await;

                tracing::debug!(job = registration.name, "Job started");
                if let Err(error) = registration.kind.run().await {
                    tracing::error!(
                        job = registration.name,
                        error = %error,
                        "Scheduled job failed"
                    );
                    notifier
                        .send_traceback_message_safe(
                            &format!("Scheduled job \"{}\" failed: {error}", registration.name),
                            &format!("{error:?}"),
                            NotifyLevel::Error,
                        )
                        .await;
                }
            }
        }));
    }

    for handle in handles {
        if let Err(error) = handle.await {
            tracing::error!(error = %error, "Scheduler task terminated");
        }
    }
}
