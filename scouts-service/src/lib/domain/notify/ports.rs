use std::path::Path;

use async_trait::async_trait;

use crate::domain::notify::errors::BotError;
use crate::domain::notify::models::MessageId;

/// Delivery options for a single outgoing message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendMessageOptions {
    /// Deliver without a notification sound.
    pub disable_notification: bool,
    /// Ask the bot API to interpret the text as HTML markup.
    pub parse_html: bool,
}

/// Messaging-bot transport used by the status notifier.
#[async_trait]
pub trait BotPort: Send + Sync + 'static {
    /// Send a text message; returns the identifier the chat assigned to it.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: SendMessageOptions,
    ) -> Result<MessageId, BotError>;

    /// Replace the text of an existing message in place.
    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), BotError>;

    /// Pin a message to the top of the chat.
    async fn pin_message(&self, chat_id: &str, message_id: MessageId) -> Result<(), BotError>;

    /// Deliver a file as a document with a caption, silently.
    async fn send_document(
        &self,
        chat_id: &str,
        file: &Path,
        caption: &str,
    ) -> Result<(), BotError>;
}
