use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::types::{ApiEnvelope, SendMessageRequest, SetWebhookRequest, TgUser};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error {code:?}: {description}")]
    Api { code: Option<i64>, description: String },

    #[error("Bot API returned ok without a result for {0}")]
    EmptyResult(&'static str),
}

/// The bot's own account, as reported by `getMe`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub username: String,
}

/// Outbound calls the service makes against the chat platform
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    async fn get_me(&self) -> Result<BotIdentity, TelegramError>;

    async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<(), TelegramError>;

    async fn delete_webhook(&self) -> Result<(), TelegramError>;
}

/// Bot API client over reqwest
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Point the client at a different Bot API server (self-hosted or a test double)
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope: ApiEnvelope<T> = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code,
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
            });
        }

        envelope.result.ok_or(TelegramError::EmptyResult(method))
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;
        Ok(())
    }

    async fn get_me(&self) -> Result<BotIdentity, TelegramError> {
        let me: TgUser = self.call("getMe", &json!({})).await?;
        Ok(BotIdentity {
            id: me.id,
            username: me.username.unwrap_or(me.first_name),
        })
    }

    async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<(), TelegramError> {
        let request = SetWebhookRequest {
            url,
            secret_token,
            allowed_updates: &["message"],
        };
        let _: bool = self.call("setWebhook", &request).await?;
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self.call("deleteWebhook", &json!({})).await?;
        Ok(())
    }
}
