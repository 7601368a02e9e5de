// handlers/ - one module per update kind
//
// Handlers produce a `Reply`; the router sends it. Errors bubble up as `HandlerError` and the
// router turns them into the fixed reply chosen by `HandlerError::reply_text`.

pub mod media;
pub mod messages;
pub mod new_project;
pub mod start;
pub mod status;

use std::sync::Arc;

use thiserror::Error;

use crate::database::{DatabaseError, ProjectStore};
use crate::telegram::{BotApi, TelegramError};

pub use media::{MediaError, MediaIngest};

/// Collaborators every handler may use, constructed once at startup
#[derive(Clone)]
pub struct HandlerContext {
    pub store: Arc<dyn ProjectStore>,
    pub bot: Arc<dyn BotApi>,
}

impl HandlerContext {
    pub fn new(store: Arc<dyn ProjectStore>, bot: Arc<dyn BotApi>) -> Self {
        Self { store, bot }
    }
}

/// What to send back for an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Send(String),
    Silent,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Send(text.into())
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Platform error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("Photo ingest failed: {0}")]
    Photo(#[from] MediaError),
}

impl HandlerError {
    /// The fixed reply the caller sees for this failure
    pub fn reply_text(&self) -> &'static str {
        match self {
            HandlerError::Photo(_) => messages::PHOTO_FAILED,
            HandlerError::Database(_) | HandlerError::Telegram(_) => messages::GENERIC_ERROR,
        }
    }
}

pub type HandlerResult = Result<Reply, HandlerError>;
