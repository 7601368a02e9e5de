use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::crypto::SecretCipher;
use crate::database::ProjectStore;
use crate::services::CredentialService;
use crate::types::UserId;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Store cloud-storage credentials (secret is encrypted)")]
    SetCloud {
        #[arg(help = "Platform user id")]
        user_id: UserId,
        #[arg(long, help = "Cloud account name")]
        name: String,
        #[arg(long, help = "Cloud API key")]
        api_key: String,
        #[arg(long, help = "Cloud API secret")]
        api_secret: String,
    },

    #[command(about = "Show a user's cloud credentials")]
    Show {
        #[arg(help = "Platform user id")]
        user_id: UserId,
        #[arg(long, help = "Print the decrypted API secret")]
        reveal: bool,
    },

    #[command(about = "List a user's projects, oldest (default) first")]
    Projects {
        #[arg(help = "Platform user id")]
        user_id: UserId,
    },

    #[command(about = "List a user's stored files")]
    Files {
        #[arg(help = "Platform user id")]
        user_id: UserId,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let store: Arc<dyn ProjectStore> = Arc::new(connect_store(&config).await?);

    match cmd {
        UserCommands::SetCloud {
            user_id,
            name,
            api_key,
            api_secret,
        } => {
            let service = CredentialService::new(store, SecretCipher::new(&config.security.encryption_key));
            service.set(user_id, &name, &api_key, &api_secret).await?;
            output_success(
                &output_format,
                &format!("Cloud credentials stored for user {}", user_id),
                None,
            )
        }
        UserCommands::Show { user_id, reveal } => {
            let service = CredentialService::new(store, SecretCipher::new(&config.security.encryption_key));
            let creds = service.get(user_id).await?;
            let secret = match (&creds.api_secret, reveal) {
                (None, _) => "(none)".to_string(),
                (Some(s), true) => s.clone(),
                (Some(_), false) => "(set)".to_string(),
            };

            match output_format {
                OutputFormat::Json => {
                    let data = json!({
                        "user_id": user_id,
                        "cloud_name": creds.cloud_name,
                        "api_key": creds.api_key,
                        "api_secret": secret,
                    });
                    println!("{}", serde_json::to_string_pretty(&data)?);
                }
                OutputFormat::Text => {
                    println!("User:       {}", user_id);
                    println!("Cloud name: {}", creds.cloud_name.as_deref().unwrap_or("(none)"));
                    println!("API key:    {}", creds.api_key.as_deref().unwrap_or("(none)"));
                    println!("API secret: {}", secret);
                }
            }
            Ok(())
        }
        UserCommands::Projects { user_id } => {
            let projects = store.list_projects(user_id).await?;
            if projects.is_empty() {
                return output_empty_collection(&output_format, "projects", "No projects");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "projects": projects }))?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<20} {}", "ID", "CREATED", "NAME");
                    println!("{}", "-".repeat(80));
                    for (i, p) in projects.iter().enumerate() {
                        let marker = if i == 0 { "*" } else { " " };
                        println!(
                            "{}{:<37} {:<20} {}",
                            marker,
                            p.id,
                            p.created_at.format("%Y-%m-%d %H:%M"),
                            p.name
                        );
                    }
                }
            }
            Ok(())
        }
        UserCommands::Files { user_id } => {
            let files = store.list_files(user_id).await?;
            if files.is_empty() {
                return output_empty_collection(&output_format, "files", "No files");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "files": files }))?);
                }
                OutputFormat::Text => {
                    println!("{:<37} {:<37} {:<20} {}", "ID", "PROJECT", "CREATED", "PLATFORM FILE");
                    println!("{}", "-".repeat(120));
                    for f in &files {
                        println!(
                            "{:<37} {:<37} {:<20} {}",
                            f.id,
                            f.project_id,
                            f.created_at.format("%Y-%m-%d %H:%M"),
                            f.platform_file_id
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
