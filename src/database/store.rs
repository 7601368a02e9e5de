use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{FileRecord, Project, User, DEFAULT_PROJECT_NAME};
use super::schema;
use crate::types::UserId;

/// Persistence for users, projects and files.
///
/// Nothing here retries; a failed statement is returned to the caller as-is.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Create tables and the uuid extension if absent
    async fn ensure_schema(&self) -> Result<(), DatabaseError>;

    /// Insert the user row unless one exists
    async fn upsert_user(&self, id: UserId) -> Result<(), DatabaseError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, DatabaseError>;

    /// Id of the owner's earliest project, creating one named [`DEFAULT_PROJECT_NAME`] if
    /// the owner has none.
    ///
    /// Select-then-insert without a transaction: two concurrent first uploads from a new
    /// owner can each create a project. The earliest one stays the default afterwards.
    async fn get_or_create_default_project(&self, owner_id: UserId) -> Result<Uuid, DatabaseError>;

    async fn create_project(&self, owner_id: UserId, name: &str) -> Result<Project, DatabaseError>;

    /// Owner's projects, oldest first
    async fn list_projects(&self, owner_id: UserId) -> Result<Vec<Project>, DatabaseError>;

    /// Append a file row. Not idempotent: a redelivered update writes a second row.
    async fn insert_file(
        &self,
        project_id: Uuid,
        owner_id: UserId,
        platform_file_id: &str,
    ) -> Result<FileRecord, DatabaseError>;

    /// Owner's files, oldest first
    async fn list_files(&self, owner_id: UserId) -> Result<Vec<FileRecord>, DatabaseError>;

    /// Store cloud credentials; `api_secret_envelope` must already be encrypted
    async fn set_cloud_credentials(
        &self,
        user_id: UserId,
        cloud_name: &str,
        api_key: &str,
        api_secret_envelope: &str,
    ) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Postgres-backed store over the shared pool
#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        schema::ensure_schema(&self.pool).await
    }

    async fn upsert_user(&self, id: UserId) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, created_at, cloud_name, cloud_api_key, cloud_api_secret_encrypted
             FROM users
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_or_create_default_project(&self, owner_id: UserId) -> Result<Uuid, DatabaseError> {
        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM projects WHERE owner_id = $1 ORDER BY created_at, id LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id,)) = existing {
            return Ok(id);
        }

        let project = self.create_project(owner_id, DEFAULT_PROJECT_NAME).await?;
        tracing::info!("Created default project {} for owner {}", project.id, owner_id);
        Ok(project.id)
    }

    async fn create_project(&self, owner_id: UserId, name: &str) -> Result<Project, DatabaseError> {
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (owner_id, name) VALUES ($1, $2)
             RETURNING id, owner_id, name, created_at",
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    async fn list_projects(&self, owner_id: UserId) -> Result<Vec<Project>, DatabaseError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, owner_id, name, created_at
             FROM projects
             WHERE owner_id = $1
             ORDER BY created_at, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn insert_file(
        &self,
        project_id: Uuid,
        owner_id: UserId,
        platform_file_id: &str,
    ) -> Result<FileRecord, DatabaseError> {
        let file = sqlx::query_as::<_, FileRecord>(
            "INSERT INTO files (project_id, owner_id, telegram_file_id, created_at)
             VALUES ($1, $2, $3, now())
             RETURNING id, project_id, owner_id, telegram_file_id, thumbnail_url, cloudinary_url, created_at",
        )
        .bind(project_id)
        .bind(owner_id)
        .bind(platform_file_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    async fn list_files(&self, owner_id: UserId) -> Result<Vec<FileRecord>, DatabaseError> {
        let files = sqlx::query_as::<_, FileRecord>(
            "SELECT id, project_id, owner_id, telegram_file_id, thumbnail_url, cloudinary_url, created_at
             FROM files
             WHERE owner_id = $1
             ORDER BY created_at, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn set_cloud_credentials(
        &self,
        user_id: UserId,
        cloud_name: &str,
        api_key: &str,
        api_secret_envelope: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO users (id, cloud_name, cloud_api_key, cloud_api_secret_encrypted)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                cloud_name = EXCLUDED.cloud_name,
                cloud_api_key = EXCLUDED.cloud_api_key,
                cloud_api_secret_encrypted = EXCLUDED.cloud_api_secret_encrypted",
        )
        .bind(user_id)
        .bind(cloud_name)
        .bind(api_key)
        .bind(api_secret_envelope)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
