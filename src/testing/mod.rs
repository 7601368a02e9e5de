//! In-process doubles for the store and the platform client, used by unit and
//! integration tests to drive dispatch without Postgres or the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::{DatabaseError, FileRecord, Project, ProjectStore, User, DEFAULT_PROJECT_NAME};
use crate::telegram::{BotApi, BotIdentity, TelegramError};
use crate::types::UserId;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    files: Vec<FileRecord>,
}

/// `ProjectStore` over in-memory vectors, with switchable write failures
#[derive(Default)]
pub struct MemoryProjectStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    unreachable: AtomicBool,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write return a query error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the health ping fail as if the pool could not hand out a connection
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.lock().files.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // a panicked test thread must not wedge the others
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_write(&self) -> Result<(), DatabaseError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("simulated write failure".to_string()));
        }
        Ok(())
    }

    fn require_user(tables: &Tables, id: UserId) -> Result<(), DatabaseError> {
        if tables.users.iter().any(|u| u.id == id) {
            Ok(())
        } else {
            Err(DatabaseError::QueryError(format!(
                "foreign key violation: user {} does not exist",
                id
            )))
        }
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn upsert_user(&self, id: UserId) -> Result<(), DatabaseError> {
        self.check_write()?;
        let mut tables = self.lock();
        if !tables.users.iter().any(|u| u.id == id) {
            tables.users.push(User {
                id,
                created_at: Utc::now(),
                cloud_name: None,
                cloud_api_key: None,
                cloud_api_secret_encrypted: None,
            });
        }
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_or_create_default_project(&self, owner_id: UserId) -> Result<Uuid, DatabaseError> {
        // projects are appended in creation order, so the first match is the earliest
        let existing = self
            .lock()
            .projects
            .iter()
            .find(|p| p.owner_id == owner_id)
            .map(|p| p.id);
        if let Some(id) = existing {
            return Ok(id);
        }
        Ok(self.create_project(owner_id, DEFAULT_PROJECT_NAME).await?.id)
    }

    async fn create_project(&self, owner_id: UserId, name: &str) -> Result<Project, DatabaseError> {
        self.check_write()?;
        let mut tables = self.lock();
        Self::require_user(&tables, owner_id)?;
        let project = Project {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn list_projects(&self, owner_id: UserId) -> Result<Vec<Project>, DatabaseError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_file(
        &self,
        project_id: Uuid,
        owner_id: UserId,
        platform_file_id: &str,
    ) -> Result<FileRecord, DatabaseError> {
        self.check_write()?;
        let mut tables = self.lock();
        if !tables.projects.iter().any(|p| p.id == project_id) {
            return Err(DatabaseError::QueryError(format!(
                "foreign key violation: project {} does not exist",
                project_id
            )));
        }
        let file = FileRecord {
            id: Uuid::new_v4(),
            project_id,
            owner_id,
            platform_file_id: platform_file_id.to_string(),
            thumbnail_url: None,
            cloudinary_url: None,
            created_at: Utc::now(),
        };
        tables.files.push(file.clone());
        Ok(file)
    }

    async fn list_files(&self, owner_id: UserId) -> Result<Vec<FileRecord>, DatabaseError> {
        Ok(self
            .lock()
            .files
            .iter()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn set_cloud_credentials(
        &self,
        user_id: UserId,
        cloud_name: &str,
        api_key: &str,
        api_secret_envelope: &str,
    ) -> Result<(), DatabaseError> {
        self.upsert_user(user_id).await?;
        let mut tables = self.lock();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.cloud_name = Some(cloud_name.to_string());
            user.cloud_api_key = Some(api_key.to_string());
            user.cloud_api_secret_encrypted = Some(api_secret_envelope.to_string());
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// A message the bot tried to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
}

/// `BotApi` that records outbound calls instead of making them
pub struct RecordingBot {
    identity: BotIdentity,
    sent: Mutex<Vec<SentMessage>>,
    webhooks: Mutex<Vec<String>>,
    fail_sends: AtomicBool,
    fail_webhooks: AtomicBool,
}

impl Default for RecordingBot {
    fn default() -> Self {
        Self::new("nezarat_test_bot")
    }
}

impl RecordingBot {
    pub fn new(username: &str) -> Self {
        Self {
            identity: BotIdentity {
                id: 1,
                username: username.to_string(),
            },
            sent: Mutex::new(Vec::new()),
            webhooks: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            fail_webhooks: AtomicBool::new(false),
        }
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make `set_webhook` answer like the platform rejecting the URL
    pub fn fail_webhooks(&self, fail: bool) {
        self.fail_webhooks.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent().last().map(|m| m.text.clone())
    }

    pub fn webhooks(&self) -> Vec<String> {
        self.webhooks.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl BotApi for RecordingBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TelegramError::Api {
                code: Some(403),
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMessage {
                chat_id,
                text: text.to_string(),
            });
        Ok(())
    }

    async fn get_me(&self) -> Result<BotIdentity, TelegramError> {
        Ok(self.identity.clone())
    }

    async fn set_webhook(&self, url: &str, _secret_token: Option<&str>) -> Result<(), TelegramError> {
        if self.fail_webhooks.load(Ordering::SeqCst) {
            return Err(TelegramError::Api {
                code: Some(400),
                description: "Bad Request: bad webhook: HTTPS url must be provided for webhook".to_string(),
            });
        }
        self.webhooks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<(), TelegramError> {
        self.webhooks.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }
}
