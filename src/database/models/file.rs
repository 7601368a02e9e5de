use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub owner_id: i64,
    /// Opaque media reference on the chat platform
    #[sqlx(rename = "telegram_file_id")]
    pub platform_file_id: String,
    // Nothing populates these yet; the remote copy step does not exist.
    pub thumbnail_url: Option<String>,
    pub cloudinary_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
