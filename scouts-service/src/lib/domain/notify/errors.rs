use thiserror::Error;

/// Errors raised by the messaging-bot transport.
#[derive(Debug, Clone, Error)]
pub enum BotError {
    /// The bot API rejected the request payload; carries the API's
    /// description verbatim.
    #[error("Bot API rejected request: {0}")]
    BadRequest(String),

    /// Any other non-success answer from the bot API.
    #[error("Bot API error (status {status}): {description}")]
    Api { status: u16, description: String },

    /// The request never got a usable answer (transport, timeout,
    /// malformed response body).
    #[error("Bot request failed: {0}")]
    Request(String),
}
