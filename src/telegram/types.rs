// Wire types for the subset of the Telegram Bot API this service reads and writes
use serde::{Deserialize, Serialize};

/// Inbound webhook body. Unknown fields are ignored so new update kinds don't fail parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUpdate {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub from: Option<TgUser>,
    pub chat: Chat,
    pub text: Option<String>,
    /// Size-ascending list of the same image
    pub photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

/// `{ok, result, description}` envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SetWebhookRequest<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<&'a str>,
    pub allowed_updates: &'a [&'a str],
}
