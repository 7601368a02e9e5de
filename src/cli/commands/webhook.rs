use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::telegram::{BotApi, TelegramClient};

#[derive(Subcommand)]
pub enum WebhookCommands {
    #[command(about = "Register the webhook URL (defaults to BASE_URL/webhook)")]
    Set {
        #[arg(long, help = "Full webhook URL to register instead of BASE_URL/webhook")]
        url: Option<String>,
    },

    #[command(about = "Remove the registered webhook")]
    Delete,
}

pub async fn handle(cmd: WebhookCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = TelegramClient::new(config.bot.token.clone());

    match cmd {
        WebhookCommands::Set { url } => {
            let url = url
                .or_else(|| config.bot.webhook_url())
                .ok_or_else(|| anyhow::anyhow!("no --url given and BASE_URL is not set"))?;
            client
                .set_webhook(&url, config.bot.webhook_secret.as_deref())
                .await?;
            output_success(
                &output_format,
                &format!("Webhook set: {}", url),
                Some(json!({ "url": url })),
            )
        }
        WebhookCommands::Delete => {
            client.delete_webhook().await?;
            output_success(&output_format, "Webhook removed", None)
        }
    }
}
