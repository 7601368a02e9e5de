use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::{messages, HandlerContext, HandlerResult, Reply};
use crate::database::{DatabaseError, FileRecord, ProjectStore};
use crate::types::{PhotoVariant, UserId};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Photo update carried no size variants")]
    NoVariants,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Turns an inbound photo into a file row under the owner's default project
pub struct MediaIngest {
    store: Arc<dyn ProjectStore>,
}

impl MediaIngest {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// Largest variant: the platform lists sizes ascending, so the last one
    pub fn select_variant(variants: &[PhotoVariant]) -> Option<&PhotoVariant> {
        variants.last()
    }

    /// Record the photo. Steps are not rolled back on failure: a user or project created
    /// before the failing statement stays.
    pub async fn ingest(
        &self,
        caller: UserId,
        variants: &[PhotoVariant],
    ) -> Result<FileRecord, MediaError> {
        let best = Self::select_variant(variants).ok_or(MediaError::NoVariants)?;

        self.store.upsert_user(caller).await?;
        let project_id = self.store.get_or_create_default_project(caller).await?;
        let file = self
            .store
            .insert_file(project_id, caller, &best.platform_file_id)
            .await?;

        info!(
            "Stored file {} ({}x{}) in project {} for owner {}",
            file.id, best.width, best.height, project_id, caller
        );
        Ok(file)
    }
}

/// Photo updates
pub async fn handle(ctx: &HandlerContext, caller: UserId, variants: &[PhotoVariant]) -> HandlerResult {
    MediaIngest::new(ctx.store.clone())
        .ingest(caller, variants)
        .await?;
    Ok(Reply::text(messages::PHOTO_SAVED))
}
