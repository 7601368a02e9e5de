use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

/// Every statement is `IF NOT EXISTS`, so running the whole list on each boot is safe.
/// Statements run one at a time; Postgres rejects multi-statement prepared queries.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE EXTENSION IF NOT EXISTS "pgcrypto""#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT PRIMARY KEY,
        created_at timestamptz NOT NULL DEFAULT now(),
        cloud_name TEXT,
        cloud_api_key TEXT,
        cloud_api_secret_encrypted TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
        owner_id BIGINT NOT NULL REFERENCES users(id),
        name TEXT NOT NULL,
        created_at timestamptz NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_projects_owner_created
        ON projects(owner_id, created_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
        project_id uuid NOT NULL REFERENCES projects(id),
        owner_id BIGINT NOT NULL,
        telegram_file_id TEXT NOT NULL,
        thumbnail_url TEXT,
        cloudinary_url TEXT,
        created_at timestamptz NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_files_owner_created
        ON files(owner_id, created_at)
    "#,
];

/// Create the extension, tables and indexes if absent
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
