use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use tokio::process::Command;

use crate::config::DatabaseConfig;
use crate::domain::notify::ports::BotPort;

/// Daily database dump delivered to the dump chat as a silent document.
pub struct DbDumpJob<B>
where
    B: BotPort,
{
    database: DatabaseConfig,
    project_name: String,
    dump_chat_id: String,
    bot: Arc<B>,
}

impl<B> DbDumpJob<B>
where
    B: BotPort,
{
    pub fn new(
        database: DatabaseConfig,
        project_name: String,
        dump_chat_id: String,
        bot: Arc<B>,
    ) -> Self {
        Self {
            database,
            project_name,
            dump_chat_id,
            bot,
        }
    }

    fn dump_path(&self, now: DateTime<Utc>) -> PathBuf {
        std::env::temp_dir().join(format!(
            "{}_{}.sql",
            self.project_name,
            now.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Run `pg_dump`, ship the file, then clean it up. The temp file is
    /// removed even when delivery fails.
    pub async fn run(&self) -> anyhow::Result<()> {
        let path = self.dump_path(Utc::now());

        let output = Command::new("pg_dump")
            .arg("--host")
            .arg(&self.database.host)
            .arg("--port")
            .arg(self.database.port.to_string())
            .arg("--username")
            .arg(&self.database.user)
            .arg("--dbname")
            .arg(&self.database.database)
            .arg("--file")
            .arg(&path)
            .env("PGPASSWORD", &self.database.password)
            .output()
            .await
            .context("failed to spawn pg_dump")?;

        if !output.status.success() {
            bail!(
                "pg_dump exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let delivery = self
            .bot
            .send_document(&self.dump_chat_id, &path, &self.project_name)
            .await;

        if let Err(error) = tokio::fs::remove_file(&path).await {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "Failed to remove dump file"
            );
        }

        delivery.context("failed to deliver database dump")?;

        Ok(())
    }
}
