use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::notify::errors::BotError;
use crate::domain::notify::models::MessageId;
use crate::domain::notify::models::NotifyLevel;
use crate::domain::notify::models::PingReport;
use crate::domain::notify::ports::BotPort;
use crate::domain::notify::ports::SendMessageOptions;

/// Hard limit the bot API places on a single text message.
const MAX_MESSAGE_CHARS: usize = 4000;

/// Timestamp format used in the status report header.
const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Needle identifying the bot API's "unterminated inline code" rejection.
const UNCLOSED_CODE_TAG: &str = "find end tag corresponding to start tag";

/// Status and error reporting through the messaging bot.
///
/// Owns the "last pinned status message" handle: unset at construction,
/// set on the first status send, reused for in-place edits on repeated
/// healthy ticks. Any failing check forces a fresh send + pin so the
/// failure is never hidden inside an edit of a possibly-muted message.
pub struct StatusNotifier<B>
where
    B: BotPort,
{
    bot: Arc<B>,
    error_chat_id: String,
    pinned: Mutex<Option<MessageId>>,
}

impl<B> StatusNotifier<B>
where
    B: BotPort,
{
    pub fn new(bot: Arc<B>, error_chat_id: impl Into<String>) -> Self {
        Self {
            bot,
            error_chat_id: error_chat_id.into(),
            pinned: Mutex::new(None),
        }
    }

    /// Deliver a ping report, editing the pinned message when possible.
    ///
    /// # Errors
    /// * `BotError` - the underlying send/edit/pin call failed; callers on
    ///   scheduled paths are expected to recover via the safe variants
    pub async fn send_ping_status(&self, report: &PingReport) -> Result<(), BotError> {
        let text = Self::format_report(report);
        let all_ok = report.all_ok();

        let mut pinned = self.pinned.lock().await;
        match *pinned {
            Some(message_id) if all_ok => {
                self.bot
                    .edit_message(&self.error_chat_id, message_id, &text)
                    .await?;
            }
            _ => {
                let message_id = self
                    .bot
                    .send_message(&self.error_chat_id, &text, SendMessageOptions::default())
                    .await?;
                self.bot.pin_message(&self.error_chat_id, message_id).await?;
                *pinned = Some(message_id);
            }
        }

        Ok(())
    }

    /// Send an HTML text message, split into chunks of at most 4000
    /// characters, delivered in order.
    ///
    /// A rejection for an unterminated `<code>` tag is recovered by closing
    /// the tag at the end of the offending chunk and reopening it at the
    /// start of the next one, so long code blocks survive chunking.
    ///
    /// # Errors
    /// * `BotError` - any other delivery failure
    pub async fn send_message(
        &self,
        text: &str,
        level: NotifyLevel,
        chat_id: Option<&str>,
    ) -> Result<(), BotError> {
        let chat_id = chat_id.unwrap_or(&self.error_chat_id);
        let options = SendMessageOptions {
            disable_notification: level.is_silent(),
            parse_html: true,
        };

        let mut message = text.to_string();
        while !message.is_empty() {
            let chunk: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
            let rest: String = message.chars().skip(MAX_MESSAGE_CHARS).collect();

            match self.bot.send_message(chat_id, &chunk, options).await {
                Ok(_) => message = rest,
                Err(BotError::BadRequest(description))
                    if description.contains(UNCLOSED_CODE_TAG) =>
                {
                    let closed = format!("{chunk}</code>");
                    self.bot.send_message(chat_id, &closed, options).await?;
                    // Nothing to reopen when the rejected chunk was the last
                    message = if rest.is_empty() {
                        rest
                    } else {
                        format!("<code>{rest}")
                    };
                }
                Err(error) => return Err(error),
            }
        }

        Ok(())
    }

    /// Send a human message plus a code block, escaping markup-significant
    /// characters in both.
    pub async fn send_traceback_message(
        &self,
        message: &str,
        code: &str,
        level: NotifyLevel,
    ) -> Result<(), BotError> {
        let text = format!(
            "{}\n\n<code>{}</code>",
            escape_html(message),
            escape_html(code)
        );
        self.send_message(&text, level, None).await
    }

    /// Like [`send_message`](Self::send_message), but a delivery failure is
    /// logged and swallowed. For use where a secondary notification failure
    /// must never mask the failure being reported.
    pub async fn send_message_safe(&self, text: &str, level: NotifyLevel, chat_id: Option<&str>) {
        if let Err(error) = self.send_message(text, level, chat_id).await {
            tracing::error!(error = %error, "Error while sending error message");
        }
    }

    /// Log-and-swallow variant of
    /// [`send_traceback_message`](Self::send_traceback_message).
    pub async fn send_traceback_message_safe(
        &self,
        message: &str,
        code: &str,
        level: NotifyLevel,
    ) {
        if let Err(error) = self.send_traceback_message(message, code, level).await {
            tracing::error!(error = %error, "Error while sending error message");
        }
    }

    fn format_report(report: &PingReport) -> String {
        let mut message = format!(
            "Ping status (last update: {}):\n",
            Utc::now().format(DT_FORMAT)
        );
        for host in report.hosts() {
            message.push_str(&format!("\n{}:\n", host.host));
            for (endpoint, status) in &host.checks {
                let emoji = if status.is_successful() { "✅" } else { "❌" };
                message.push_str(&format!("{emoji}{endpoint}: {status}\n"));
            }
        }
        message
    }
}

fn escape_html(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use mockall::mock;
    use mockall::Sequence;

    use super::*;
    use crate::domain::notify::models::ProbeStatus;

    mock! {
        pub Bot {}

        #[async_trait]
        impl BotPort for Bot {
            async fn send_message(
                &self,
                chat_id: &str,
                text: &str,
                options: SendMessageOptions,
            ) -> Result<MessageId, BotError>;
            async fn edit_message(
                &self,
                chat_id: &str,
                message_id: MessageId,
                text: &str,
            ) -> Result<(), BotError>;
            async fn pin_message(&self, chat_id: &str, message_id: MessageId) -> Result<(), BotError>;
            async fn send_document(
                &self,
                chat_id: &str,
                file: &Path,
                caption: &str,
            ) -> Result<(), BotError>;
        }
    }

    const CHAT: &str = "-100200300";

    fn all_ok_report() -> PingReport {
        let mut report = PingReport::new();
        for host in ["nginx:80", "app:8090"] {
            report.record(host, "ping_database", ProbeStatus::Successful);
            report.record(host, "ping_application", ProbeStatus::Successful);
        }
        report
    }

    fn failing_report() -> PingReport {
        let mut report = all_ok_report();
        report.record(
            "app:8090",
            "ping_auth",
            ProbeStatus::FailedStatus { code: 500 },
        );
        report
    }

    #[tokio::test]
    async fn test_ping_status_first_tick_sends_and_pins() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .withf(|chat_id, text, _| chat_id == CHAT && text.starts_with("Ping status"))
            .times(1)
            .returning(|_, _, _| Ok(MessageId(7)));
        bot.expect_pin_message()
            .withf(|chat_id, message_id| chat_id == CHAT && *message_id == MessageId(7))
            .times(1)
            .returning(|_, _| Ok(()));
        bot.expect_edit_message().times(0);

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier
            .send_ping_status(&all_ok_report())
            .await
            .expect("send failed");
    }

    #[tokio::test]
    async fn test_ping_status_healthy_tick_edits_in_place() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .times(1)
            .returning(|_, _, _| Ok(MessageId(7)));
        bot.expect_pin_message().times(1).returning(|_, _| Ok(()));
        bot.expect_edit_message()
            .withf(|chat_id, message_id, text| {
                chat_id == CHAT && *message_id == MessageId(7) && text.starts_with("Ping status")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier.send_ping_status(&all_ok_report()).await.unwrap();
        notifier.send_ping_status(&all_ok_report()).await.unwrap();
    }

    #[tokio::test]
    async fn test_ping_status_failure_forces_fresh_pin() {
        let mut bot = MockBot::new();
        let mut seq = Sequence::new();

        // First healthy tick pins message 7
        bot.expect_send_message()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(MessageId(7)));
        bot.expect_pin_message()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        // Failing tick must send + pin a new message, not edit
        bot.expect_send_message()
            .withf(|_, text, _| text.contains("Failed (status code: 500)"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(MessageId(8)));
        bot.expect_pin_message()
            .withf(|_, message_id| *message_id == MessageId(8))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        // Next healthy tick edits the newly pinned message
        bot.expect_edit_message()
            .withf(|_, message_id, _| *message_id == MessageId(8))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier.send_ping_status(&all_ok_report()).await.unwrap();
        notifier.send_ping_status(&failing_report()).await.unwrap();
        notifier.send_ping_status(&all_ok_report()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_message_short_single_send() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .withf(|chat_id, text, options| {
                chat_id == CHAT
                    && text == "test"
                    && !options.disable_notification
                    && options.parse_html
            })
            .times(1)
            .returning(|_, _, _| Ok(MessageId(1)));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier
            .send_message("test", NotifyLevel::Error, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_long_chunks_in_order() {
        let mut bot = MockBot::new();
        let mut seq = Sequence::new();

        bot.expect_send_message()
            .withf(|_, text, _| text.chars().count() == 4000)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(MessageId(1)));
        bot.expect_send_message()
            .withf(|_, text, _| text.chars().count() == 1000)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(MessageId(2)));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier
            .send_message(&"t".repeat(5000), NotifyLevel::Error, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_non_error_level_is_silent() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .withf(|_, _, options| options.disable_notification)
            .times(1)
            .returning(|_, _, _| Ok(MessageId(1)));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier
            .send_message("quiet", NotifyLevel::Info, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_explicit_chat_overrides_default() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .withf(|chat_id, _, _| chat_id == "-42")
            .times(1)
            .returning(|_, _, _| Ok(MessageId(1)));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier
            .send_message("elsewhere", NotifyLevel::Error, Some("-42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_recovers_unterminated_code_tag() {
        let mut bot = MockBot::new();
        let mut seq = Sequence::new();

        // First chunk is rejected for an unterminated <code> tag
        bot.expect_send_message()
            .withf(|_, text, _| text.chars().count() == 4000)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Err(BotError::BadRequest(
                    "Bad Request: can't parse entities: Can't find end tag \
                     corresponding to start tag code"
                        .to_string(),
                ))
            });
        // Retried with the tag closed at the chunk boundary
        bot.expect_send_message()
            .withf(|_, text, _| text.ends_with("</code>") && text.chars().count() == 4007)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(MessageId(1)));
        // Remainder is re-opened with <code>
        bot.expect_send_message()
            .withf(|_, text, _| text.starts_with("<code>") && text.chars().count() == 1006)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(MessageId(2)));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        let text = format!("<code>{}", "t".repeat(4994));
        notifier
            .send_message(&text, NotifyLevel::Error, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_other_bad_request_propagates() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .times(1)
            .returning(|_, _, _| Err(BotError::BadRequest("chat not found".to_string())));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        let result = notifier
            .send_message("test", NotifyLevel::Error, None)
            .await;
        assert!(matches!(result, Err(BotError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_send_traceback_message_escapes_markup() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .withf(|_, text, options| {
                text == "boom &lt;tag&gt;\n\n<code>panic at &lt;main&gt;</code>"
                    && options.disable_notification
            })
            .times(1)
            .returning(|_, _, _| Ok(MessageId(1)));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier
            .send_traceback_message("boom <tag>", "panic at <main>", NotifyLevel::Info)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_safe_variants_swallow_bot_errors() {
        let mut bot = MockBot::new();

        bot.expect_send_message()
            .times(2)
            .returning(|_, _, _| Err(BotError::Request("connection reset".to_string())));

        let notifier = StatusNotifier::new(Arc::new(bot), CHAT);
        notifier
            .send_message_safe("test", NotifyLevel::Error, None)
            .await;
        notifier
            .send_traceback_message_safe("boom", "trace", NotifyLevel::Error)
            .await;
    }
}
