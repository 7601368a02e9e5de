use clap::Subcommand;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::ProjectStore;

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "Create tables and extensions if absent (safe to repeat)")]
    Init,
}

pub async fn handle(cmd: SchemaCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SchemaCommands::Init => {
            let config = load_config()?;
            let store = connect_store(&config).await?;
            store.ensure_schema().await?;
            output_success(&output_format, "Schema is up to date", None)
        }
    }
}
