use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub cloud_name: Option<String>,
    pub cloud_api_key: Option<String>,
    /// SecretCipher envelope, never plaintext
    pub cloud_api_secret_encrypted: Option<String>,
}
