pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "nezarat")]
#[command(about = "Operator CLI for the nezarat bot backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Database schema management")]
    Schema {
        #[command(subcommand)]
        cmd: commands::schema::SchemaCommands,
    },

    #[command(about = "Webhook registration with the platform")]
    Webhook {
        #[command(subcommand)]
        cmd: commands::webhook::WebhookCommands,
    },

    #[command(about = "Encrypt or decrypt secrets with the configured key")]
    Secret {
        #[command(subcommand)]
        cmd: commands::secret::SecretCommands,
    },

    #[command(about = "User records, cloud credentials, projects and files")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Schema { cmd } => commands::schema::handle(cmd, output_format).await,
        Commands::Webhook { cmd } => commands::webhook::handle(cmd, output_format).await,
        Commands::Secret { cmd } => commands::secret::handle(cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
    }
}
