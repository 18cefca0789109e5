use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;

use crate::domain::notify::errors::BotError;
use crate::domain::notify::models::MessageId;
use crate::domain::notify::ports::BotPort;
use crate::domain::notify::ports::SendMessageOptions;

const DEFAULT_API_ROOT: &str = "https://api.telegram.org";

/// Telegram Bot API transport.
///
/// Thin JSON/multipart wrapper over the HTTP API; all policy (chunking,
/// pin/edit decisions, escaping) lives in the notifier.
pub struct TelegramBot {
    client: reqwest::Client,
    api_root: String,
    token: String,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

impl TelegramBot {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_root: DEFAULT_API_ROOT.to_string(),
            token: token.into(),
        }
    }

    /// Point the client at a different API root. Used by tests.
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_root, self.token, method)
    }

    async fn call(&self, method: &str, payload: Value) -> Result<Value, BotError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::Request(e.to_string()))?;

        Self::unwrap_response(response).await
    }

    async fn unwrap_response(response: reqwest::Response) -> Result<Value, BotError> {
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| BotError::Request(e.to_string()))?;

        if body.ok {
            return Ok(body.result.unwrap_or(Value::Null));
        }

        let description = body
            .description
            .unwrap_or_else(|| "unknown error".to_string());
        match body.error_code {
            Some(400) => Err(BotError::BadRequest(description)),
            code => Err(BotError::Api {
                status: code.unwrap_or(0),
                description,
            }),
        }
    }
}

#[async_trait]
impl BotPort for TelegramBot {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: SendMessageOptions,
    ) -> Result<MessageId, BotError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_notification": options.disable_notification,
        });
        if options.parse_html {
            payload["parse_mode"] = json!("HTML");
        }

        let result = self.call("sendMessage", payload).await?;

        result
            .get("message_id")
            .and_then(Value::as_i64)
            .map(MessageId)
            .ok_or_else(|| BotError::Request("sendMessage result had no message_id".to_string()))
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), BotError> {
        self.call(
            "editMessageText",
            json!({
                "chat_id": chat_id,
                "message_id": message_id.0,
                "text": text,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn pin_message(&self, chat_id: &str, message_id: MessageId) -> Result<(), BotError> {
        self.call(
            "pinChatMessage",
            json!({
                "chat_id": chat_id,
                "message_id": message_id.0,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn send_document(
        &self,
        chat_id: &str,
        file: &Path,
        caption: &str,
    ) -> Result<(), BotError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| BotError::Request(e.to_string()))?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("disable_notification", "true")
            .part(
                "document",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BotError::Request(e.to_string()))?;

        Self::unwrap_response(response).await.map(|_| ())
    }
}
