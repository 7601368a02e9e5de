pub mod client;
pub mod types;

pub use client::{BotApi, BotIdentity, TelegramClient, TelegramError};
pub use types::RawUpdate;
