use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgProjectStore};

/// Full configuration, loading `.env` first like the server does
pub fn load_config() -> anyhow::Result<AppConfig> {
    let _ = dotenvy::dotenv();
    AppConfig::from_env().context("invalid configuration")
}

/// Connect to the configured database
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<PgProjectStore> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    Ok(PgProjectStore::new(pool))
}

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}
