use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::AppState;
use crate::config::{AppConfig, BotConfig};
use crate::database::ProjectStore;
use crate::dispatch::{AdminGate, UpdateRouter};
use crate::handlers::HandlerContext;
use crate::telegram::{BotApi, TelegramError};

/// Wire the router and HTTP state from config and the two external collaborators.
///
/// Resolves the bot's own username once so group commands can be matched against it.
pub async fn build_state(
    config: &AppConfig,
    store: Arc<dyn ProjectStore>,
    bot: Arc<dyn BotApi>,
) -> Result<AppState, TelegramError> {
    if config.bot.admin_id.is_none() && !config.bot.admin_only_commands.is_empty() {
        warn!("ADMIN_TELEGRAM_ID not set; admin-only commands will be refused for everyone");
    }

    let identity = bot.get_me().await?;
    info!("Running as @{}", identity.username);

    let router = UpdateRouter::new(
        HandlerContext::new(store.clone(), bot),
        AdminGate::new(config.bot.admin_id.clone()),
        config.bot.admin_only_commands.clone(),
    );

    Ok(AppState::new(
        Arc::new(router),
        store,
        identity.username,
        config.bot.webhook_secret.clone(),
    ))
}

/// Register `<BASE_URL>/webhook` with the platform. Failure is logged and otherwise ignored.
///
/// Returns whether a registration succeeded.
pub async fn register_webhook(bot: &dyn BotApi, config: &BotConfig) -> bool {
    let Some(url) = config.webhook_url() else {
        info!("BASE_URL not set; skipping webhook registration");
        return false;
    };

    match bot.set_webhook(&url, config.webhook_secret.as_deref()).await {
        Ok(()) => {
            info!("Webhook set: {}", url);
            true
        }
        Err(e) => {
            error!("Webhook registration failed: {}", e);
            false
        }
    }
}
