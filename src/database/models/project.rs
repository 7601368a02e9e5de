use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Display name given to the project created lazily on first upload
pub const DEFAULT_PROJECT_NAME: &str = "پروژه پیش‌فرض";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
